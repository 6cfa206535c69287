use crate::common::units::{convert_energy, EnergyUnit};
use crate::domain::{
    Adf04Error, Document, Header, LevelEntry, LevelTable, ParserResult, RateRecord, RateTable,
    TemperatureGrid, TransitionKey,
};
use crate::modules::normalize::{parse_rate_value, split_infinite_point};

/// Character count of the term suffix appended to the ionization potential
/// in the header line, e.g. `(1S0)`.
const POTENTIAL_SUFFIX_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Header,
    Energies,
    Temperatures,
    Rates,
    Trailer,
    Done,
}

impl ParserState {
    const fn describe(self) -> &'static str {
        match self {
            Self::Header => "header line",
            Self::Energies => "energy level block",
            Self::Temperatures => "temperature line",
            Self::Rates => "rate block",
            Self::Trailer => "closing sentinel pair",
            Self::Done => "end of file",
        }
    }
}

/// Parses a whole ADF04 file, storing the ionization potential in Rydbergs.
pub fn parse_document(source: &str) -> ParserResult<Document> {
    parse_document_with_unit(source, EnergyUnit::Rydberg)
}

/// Parses a whole ADF04 file with the header potential converted to `unit`.
/// The input is consumed by a line-oriented state machine:
/// header, energy levels until `-1`, one temperature line, rates until `-1`
/// followed by `-1  -1`.
pub fn parse_document_with_unit(source: &str, unit: EnergyUnit) -> ParserResult<Document> {
    let mut state = ParserState::Header;
    let mut header: Option<Header> = None;
    let mut temperatures: Option<TemperatureGrid> = None;
    let mut energy_lines: Vec<&str> = Vec::new();
    let mut rate_lines: Vec<(usize, &str)> = Vec::new();

    for (offset, line) in source.lines().enumerate() {
        let number = offset + 1;
        match state {
            ParserState::Header => {
                header = Some(parse_header(line, unit).map_err(|error| error.with_line(number))?);
                state = ParserState::Energies;
            }
            ParserState::Energies => {
                if line.trim() == "-1" {
                    state = ParserState::Temperatures;
                } else {
                    energy_lines.push(line);
                }
            }
            ParserState::Temperatures => {
                temperatures =
                    Some(parse_temperature_line(line).map_err(|error| error.with_line(number))?);
                state = ParserState::Rates;
            }
            ParserState::Rates => {
                if line.trim() == "-1" {
                    state = ParserState::Trailer;
                } else {
                    rate_lines.push((number, line));
                }
            }
            ParserState::Trailer => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens == ["-1", "-1"] {
                    state = ParserState::Done;
                } else if !line.trim().is_empty() {
                    return Err(Adf04Error::parse(
                        "PARSE.TRAILING_CONTENT",
                        format!("expected the doubled '-1  -1' sentinel, found '{line}'"),
                    )
                    .with_line(number));
                }
            }
            ParserState::Done => {
                if !line.trim().is_empty() {
                    return Err(Adf04Error::parse(
                        "PARSE.TRAILING_CONTENT",
                        format!("unexpected content after the closing sentinels: '{line}'"),
                    )
                    .with_line(number));
                }
            }
        }
    }

    if state != ParserState::Done {
        return Err(Adf04Error::parse(
            "PARSE.MISSING_SENTINEL",
            format!("input ended inside the {}", state.describe()),
        ));
    }

    let header = header.ok_or_else(|| {
        Adf04Error::parse("PARSE.MISSING_SENTINEL", "input ended before the header line")
    })?;
    let temperatures = temperatures.ok_or_else(|| {
        Adf04Error::parse(
            "PARSE.MISSING_SENTINEL",
            "input ended before the temperature line",
        )
    })?;
    let levels = parse_level_block(&energy_lines)?;
    let rates = parse_rate_block(&rate_lines)?;

    let level_indices: std::collections::HashSet<&str> = levels
        .iter()
        .map(|entry| canonical_index(entry.index()))
        .collect();
    for (key, _) in rates.iter() {
        for index in [key.lower(), key.upper()] {
            if !level_indices.contains(canonical_index(index)) {
                return Err(Adf04Error::parse(
                    "PARSE.DANGLING_TRANSITION",
                    format!(
                        "transition ({}, {}) references level '{}' which is not in the level table",
                        key.lower(),
                        key.upper(),
                        index
                    ),
                ));
            }
        }
    }

    Ok(Document {
        header,
        levels,
        temperatures,
        rates,
    })
}

/// Renumbered files zero-pad level indices but not transition endpoints,
/// so index identity ignores leading zeros.
fn canonical_index(index: &str) -> &str {
    let trimmed = index.trim_start_matches('0');
    if trimmed.is_empty() { "0" } else { trimmed }
}

fn parse_header(line: &str, unit: EnergyUnit) -> ParserResult<Header> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(Adf04Error::parse(
            "PARSE.HEADER_FIELDS",
            format!("header line has {} fields, expected at least 5", tokens.len()),
        ));
    }

    let charge = tokens[1].parse::<i32>().map_err(|_| {
        Adf04Error::parse(
            "PARSE.HEADER_FIELDS",
            format!("nuclear charge '{}' is not an integer", tokens[1]),
        )
    })?;
    let atomic_number = tokens[2].parse::<i32>().map_err(|_| {
        Adf04Error::parse(
            "PARSE.HEADER_FIELDS",
            format!("atomic number '{}' is not an integer", tokens[2]),
        )
    })?;

    let potential_token = tokens[4];
    if !potential_token.is_ascii() {
        return Err(Adf04Error::parse(
            "PARSE.HEADER_FIELDS",
            format!("ionization potential '{potential_token}' contains non-ASCII text"),
        ));
    }
    if potential_token.len() <= POTENTIAL_SUFFIX_WIDTH {
        return Err(Adf04Error::parse(
            "PARSE.HEADER_FIELDS",
            format!(
                "ionization potential '{potential_token}' is too short to carry its {POTENTIAL_SUFFIX_WIDTH}-character term suffix"
            ),
        ));
    }
    let value_text = &potential_token[..potential_token.len() - POTENTIAL_SUFFIX_WIDTH];
    let wavenumbers = value_text.parse::<f64>().map_err(|_| {
        Adf04Error::parse(
            "PARSE.HEADER_FIELDS",
            format!("ionization potential '{value_text}' is not numeric"),
        )
    })?;

    Ok(Header {
        raw_line: line.to_string(),
        charge,
        atomic_number,
        ionization_potential: convert_energy(wavenumbers, EnergyUnit::InverseCm, unit),
        potential_unit: unit,
    })
}

fn parse_temperature_line(line: &str) -> ParserResult<TemperatureGrid> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() <= 2 {
        return Err(Adf04Error::parse(
            "PARSE.TEMPERATURE_LINE",
            format!(
                "temperature line has {} fields, expected two labels plus the grid",
                tokens.len()
            ),
        ));
    }
    let grid = tokens[2..].iter().map(|token| token.to_string()).collect();
    Ok(TemperatureGrid::new(line, grid))
}

/// A level's term text ends at a token matching `<digits>.0)`; the trailing
/// energy value follows on the same physical line. A line without that
/// token is a wrapped descriptor continuing on the next line.
fn line_ends_level(line: &str) -> bool {
    let bytes = line.as_bytes();
    (0..bytes.len().saturating_sub(3)).any(|position| {
        bytes[position].is_ascii_digit()
            && &bytes[position + 1..position + 4] == b".0)"
            && bytes
                .get(position + 4)
                .is_none_or(|next| next.is_ascii_whitespace())
    })
}

fn parse_level_block(lines: &[&str]) -> ParserResult<LevelTable> {
    let mut table = LevelTable::new();
    let mut pending: Vec<&str> = Vec::new();
    for line in lines {
        pending.push(line);
        if line_ends_level(line) {
            let entry = parse_level_entry(&pending)?;
            table.insert(entry)?;
            pending.clear();
        }
    }
    if pending.iter().any(|line| !line.trim().is_empty()) {
        return Err(Adf04Error::parse(
            "PARSE.LEVEL_CHUNK",
            format!(
                "level block ends with text that never reaches a level boundary: '{}'",
                pending.join(" ").trim()
            ),
        ));
    }
    if table.is_empty() {
        return Err(Adf04Error::parse(
            "PARSE.LEVEL_CHUNK",
            "level block contains no levels",
        ));
    }
    Ok(table)
}

fn parse_level_entry(lines: &[&str]) -> ParserResult<LevelEntry> {
    let raw = lines.join("\n");
    let trimmed = raw.trim_start();
    let Some((index, descriptor)) = trimmed.split_once(char::is_whitespace) else {
        return Err(Adf04Error::parse(
            "PARSE.LEVEL_CHUNK",
            format!("level chunk '{}' has no descriptor after its index", trimmed),
        ));
    };
    if index.is_empty() || !index.chars().all(|character| character.is_ascii_digit()) {
        return Err(Adf04Error::parse(
            "PARSE.LEVEL_CHUNK",
            format!("level chunk starts with '{index}' instead of a single index token"),
        ));
    }
    let index = index.to_string();
    let descriptor = descriptor.to_string();
    Ok(LevelEntry::new(index, descriptor, raw))
}

fn parse_rate_block(lines: &[(usize, &str)]) -> ParserResult<RateTable> {
    let mut table = RateTable::new();
    for (number, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let (key, record) =
            parse_rate_line(line).map_err(|error| error.with_line(*number))?;
        table
            .insert(key, record)
            .map_err(|error| error.with_line(*number))?;
    }
    Ok(table)
}

fn parse_rate_line(line: &str) -> ParserResult<(TransitionKey, RateRecord)> {
    let (body, infinite_point) = split_infinite_point(line)?;
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(Adf04Error::parse(
            "PARSE.RATE_LINE_FIELDS",
            format!("rate line '{}' has too few fields", line.trim()),
        ));
    }

    for index in &tokens[..2] {
        if !index.chars().all(|character| character.is_ascii_digit()) {
            return Err(Adf04Error::parse(
                "PARSE.TRANSITION_KEY",
                format!("transition index '{index}' is not numeric"),
            ));
        }
    }
    let key = TransitionKey::new(tokens[0], tokens[1]);

    // The first field after the key is the A-coefficient; the original
    // format convention excludes it from the generic numeric sweep, so it
    // is parsed on its own here.
    let a_text = tokens[2];
    let a_value = parse_rate_value(a_text)?;
    let collisional_text: Vec<String> =
        tokens[3..].iter().map(|token| token.to_string()).collect();
    let collisional = collisional_text
        .iter()
        .map(|token| parse_rate_value(token))
        .collect::<ParserResult<Vec<f64>>>()?;

    Ok((
        key,
        RateRecord::new(a_text, a_value, collisional_text, collisional, infinite_point),
    ))
}

#[cfg(test)]
mod tests {
    use super::{parse_document, parse_document_with_unit};
    use crate::common::units::{EnergyUnit, RYDBERG_IN_INVERSE_CM};
    use crate::domain::TransitionKey;

    const SAMPLE: &str = "he+ 1 2 1 438908.8(1S0)\n\
\x20  1 1S1 2S1 (3)1( 1.0)       0.0\n\
\x20  2 1S1 2S1 (1)0( 0.0)  159856.0\n\
\x20  3 1S1 2P1 (3)1( 2.0)  169087.0\n\
\x20  -1\n\
\x20  2.0  2.0   1.00+03 2.00+03\n\
\x20  1   2 2.50-01 1.00-30 1.00-30 0.00+00\n\
\x20  1   3 5.00-02 2.30-02 4.10-02 1.20+00\n\
\x20  2   3 1.00-30 3.00-02 5.00-02 0.00+00\n\
\x20 -1\n\
\x20 -1  -1\n";

    #[test]
    fn sample_document_parses_end_to_end() {
        let document = parse_document(SAMPLE).expect("sample should parse");

        assert_eq!(document.header.charge, 1);
        assert_eq!(document.header.atomic_number, 2);
        assert_eq!(document.header.potential_unit, EnergyUnit::Rydberg);
        let expected = 438_908.8 / RYDBERG_IN_INVERSE_CM;
        assert!((document.header.ionization_potential - expected).abs() < 1.0e-9);

        let indices: Vec<&str> = document.levels.iter().map(|entry| entry.index()).collect();
        assert_eq!(indices, vec!["1", "2", "3"]);
        assert_eq!(
            document.levels.get("2").and_then(|entry| entry.energy_text()),
            Some("159856.0")
        );

        assert_eq!(document.temperatures.temperatures(), ["1.00+03", "2.00+03"]);

        assert_eq!(document.rates.len(), 3);
        let record = document
            .rates
            .get(&TransitionKey::new("1", "2"))
            .expect("transition (1,2) should be present");
        assert!((record.a_value() - 2.5e-1).abs() < 1.0e-12);
        assert_eq!(record.collisional(), &[1.0e-30, 1.0e-30]);
        assert_eq!(record.infinite_point(), " 0.00+00");

        let record = document
            .rates
            .get(&TransitionKey::new("1", "3"))
            .expect("transition (1,3) should be present");
        assert!((record.a_value() - 5.0e-2).abs() < 1.0e-12);
    }

    #[test]
    fn header_potential_obeys_the_requested_unit() {
        let document = parse_document_with_unit(SAMPLE, EnergyUnit::InverseCm)
            .expect("sample should parse");
        assert!((document.header.ionization_potential - 438_908.8).abs() < 1.0e-9);
        assert_eq!(document.header.potential_unit, EnergyUnit::InverseCm);
    }

    #[test]
    fn wrapped_level_descriptors_join_across_lines() {
        let source = "he+ 1 2 1 438908.8(1S0)\n\
\x20  1 1S1 2S1 2P2\n\
\x20      3D1 (3)1( 1.0)       0.0\n\
\x20  2 1S1 2S1 (1)0( 0.0)  159856.0\n\
\x20  -1\n\
\x20  2.0  2.0   1.00+03\n\
\x20  1   2 2.50-01 1.00-30 0.00+00\n\
\x20 -1\n\
\x20 -1  -1\n";
        let document = parse_document(source).expect("wrapped descriptor should parse");
        let entry = document.levels.get("1").expect("level 1 should exist");
        assert!(entry.descriptor().contains('\n'));
        assert_eq!(entry.energy_text(), Some("0.0"));
    }

    #[test]
    fn missing_rate_sentinel_is_fatal() {
        let cut = SAMPLE.find("\n  -1\n").expect("sample has a rate sentinel");
        let error = parse_document(&SAMPLE[..cut]).expect_err("truncated input should fail");
        assert_eq!(error.code(), "PARSE.MISSING_SENTINEL");
    }

    #[test]
    fn dangling_transition_reference_is_fatal() {
        let source = SAMPLE.replace("  1   3 ", "  1   9 ");
        let error = parse_document(&source).expect_err("unknown level 9 should fail");
        assert_eq!(error.code(), "PARSE.DANGLING_TRANSITION");
    }

    #[test]
    fn level_entries_keep_verbatim_raw_text() {
        let document = parse_document(SAMPLE).expect("sample should parse");
        let entry = document.levels.get("1").expect("level 1 should exist");
        assert_eq!(entry.raw(), "   1 1S1 2S1 (3)1( 1.0)       0.0");
        assert_eq!(entry.index(), "1");
        assert_eq!(entry.descriptor(), "1S1 2S1 (3)1( 1.0)       0.0");
    }

    #[test]
    fn non_ascii_potential_token_is_a_parse_error() {
        let error = parse_document("he+ 1 2 1 1.0\u{3b7}\u{3b7}\u{3b7}\n")
            .expect_err("non-ascii potential should fail");
        assert_eq!(error.code(), "PARSE.HEADER_FIELDS");
        assert_eq!(error.line(), Some(1));
    }

    #[test]
    fn header_with_too_few_fields_is_fatal() {
        let error =
            parse_document("he+ 1 2\n").expect_err("short header should fail");
        assert_eq!(error.code(), "PARSE.HEADER_FIELDS");
        assert_eq!(error.line(), Some(1));
    }
}
