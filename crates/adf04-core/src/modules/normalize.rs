use crate::domain::{Adf04Error, ParserResult};

/// Fixed width of the trailing infinite-energy field on every rate line,
/// including its leading space. The field has its own placeholder
/// convention, so it is cut off before generic numeric handling.
pub const INFINITE_POINT_WIDTH: usize = 8;

/// Splits a rate line into its numeric body and the trailing
/// infinite-energy field.
pub fn split_infinite_point(line: &str) -> ParserResult<(&str, &str)> {
    if !line.is_ascii() {
        return Err(Adf04Error::parse(
            "PARSE.NON_ASCII",
            format!("rate line contains non-ASCII text: '{line}'"),
        ));
    }
    if line.len() < INFINITE_POINT_WIDTH {
        return Err(Adf04Error::parse(
            "PARSE.RATE_LINE_SHORT",
            format!(
                "rate line '{line}' is shorter than the {INFINITE_POINT_WIDTH}-character infinite-energy field"
            ),
        ));
    }
    let cut = line.len() - INFINITE_POINT_WIDTH;
    Ok((&line[..cut], &line[cut..]))
}

/// Inserts the exponent marker the file format omits: `1.234-05` becomes
/// `1.234e-05`. A sign is only an exponent sign when it follows a digit or
/// decimal point, which leaves leading signs and already-marked exponents
/// alone.
pub fn insert_exponent_markers(token: &str) -> String {
    let mut normalized = String::with_capacity(token.len() + 2);
    let mut previous: Option<char> = None;
    for character in token.chars() {
        if (character == '+' || character == '-')
            && matches!(previous, Some(p) if p.is_ascii_digit() || p == '.')
        {
            normalized.push('e');
        }
        normalized.push(character);
        previous = Some(character);
    }
    normalized
}

/// Parses one rate token after normalizing its exponent notation.
pub fn parse_rate_value(token: &str) -> ParserResult<f64> {
    insert_exponent_markers(token).parse::<f64>().map_err(|_| {
        Adf04Error::parse(
            "PARSE.NUMERIC_FIELD",
            format!("cannot parse rate value '{token}'"),
        )
    })
}
