use crate::common::units::EnergyUnit;
use crate::domain::{Adf04Error, Adf04Result, Document};
use crate::modules::crossmatch::{parse_reference_dataset, ReferenceDataset};
use crate::modules::parse::parse_document_with_unit;
use crate::modules::remap::LevelPermutation;
use crate::modules::serialize::serialize_document;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn read_text(path: &Path) -> Adf04Result<String> {
    fs::read_to_string(path)
        .map_err(|error| {
            Adf04Error::io("IO.READ", format!("cannot read file: {error}"))
                .in_file(path.display().to_string())
        })
}

fn write_text(path: &Path, content: &str) -> Adf04Result<()> {
    fs::write(path, content).map_err(|error| {
        Adf04Error::io("IO.WRITE", format!("cannot write file: {error}"))
            .in_file(path.display().to_string())
    })
}

/// Reads and parses an ADF04 file, attaching the path to any error.
pub fn read_document(path: &Path, unit: EnergyUnit) -> Adf04Result<Document> {
    let source = read_text(path)?;
    parse_document_with_unit(&source, unit)
        .map_err(|error| error.in_file(path.display().to_string()))
}

/// Serializes a document and writes it out.
pub fn write_document(path: &Path, document: &Document) -> Adf04Result<()> {
    let rendered = serialize_document(document)
        .map_err(|error| error.in_file(path.display().to_string()))?;
    write_text(path, &rendered)
}

/// Writes a value column as newline-terminated text.
pub fn write_column(path: &Path, column: &[String]) -> Adf04Result<()> {
    let mut content = column.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    write_text(path, &content)
}

/// Loads a level permutation from a JSON object mapping old indices to new,
/// for example `{"1": 3, "2": 1, "3": 2}`.
pub fn read_permutation_file(path: &Path) -> Adf04Result<LevelPermutation> {
    let source = read_text(path)?;
    let mapping: BTreeMap<u32, u32> = serde_json::from_str(&source).map_err(|error| {
        Adf04Error::remap(
            "REMAP.MAPPING_FILE",
            format!("permutation file is not an index-to-index JSON object: {error}"),
        )
        .in_file(path.display().to_string())
    })?;
    LevelPermutation::from_pairs(mapping)
        .map_err(|error| error.in_file(path.display().to_string()))
}

/// Loads the comma-separated reference export.
pub fn read_reference_dataset(path: &Path) -> Adf04Result<ReferenceDataset> {
    let source = read_text(path)?;
    Ok(parse_reference_dataset(&source))
}
