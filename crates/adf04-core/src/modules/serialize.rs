use crate::domain::{Adf04Result, Document, RateRecord, TransitionKey};

/// Sentinel line closing the level block.
pub const LEVEL_SENTINEL: &str = "   -1";
/// Sentinel line closing the rate block.
pub const RATE_SENTINEL: &str = "  -1";
/// Final trailer line.
pub const TRAILER_SENTINEL: &str = "  -1  -1";

/// Renders a document back to ADF04 text. Fields the pipeline did not touch
/// come out byte for byte as they were read, because every table keeps its
/// verbatim source text.
pub fn serialize_document(document: &Document) -> Adf04Result<String> {
    let mut output = String::new();
    output.push_str(&document.header.raw_line);
    output.push('\n');
    output.push_str(&render_level_block(document));
    output.push_str(LEVEL_SENTINEL);
    output.push('\n');
    output.push_str(document.temperatures.raw_line());
    output.push('\n');
    for (key, record) in document.rates.iter() {
        output.push_str(&render_rate_line(key, record)?);
        output.push('\n');
    }
    output.push_str(RATE_SENTINEL);
    output.push('\n');
    output.push_str(TRAILER_SENTINEL);
    output.push('\n');
    Ok(output)
}

/// Level lines without the closing sentinel. A wrapped descriptor renders
/// as the same physical lines it was read from.
pub fn render_level_block(document: &Document) -> String {
    let mut block = String::new();
    for entry in document.levels.iter() {
        block.push_str(entry.raw());
        block.push('\n');
    }
    block
}

/// One rate line: lead pad, packed key, space-joined value fields, and the
/// fixed-width infinite-energy field appended verbatim. The lead pad is
/// three spaces for a five-character packed key and two otherwise, keeping
/// the value columns aligned across key widths.
pub fn render_rate_line(key: &TransitionKey, record: &RateRecord) -> Adf04Result<String> {
    let packed = key.packed()?;
    let lead = if packed.len() == 5 { "   " } else { "  " };
    let mut line = String::with_capacity(
        lead.len() + packed.len() + record.infinite_point().len() + 64,
    );
    line.push_str(lead);
    line.push_str(&packed);
    line.push(' ');
    line.push_str(record.a_text());
    for token in record.collisional_text() {
        line.push(' ');
        line.push_str(token);
    }
    line.push_str(record.infinite_point());
    Ok(line)
}

/// Joins a value column into newline-separated text for standalone output.
pub fn render_column(column: &[String]) -> String {
    column.join("\n")
}
