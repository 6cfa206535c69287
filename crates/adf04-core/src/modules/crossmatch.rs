use crate::domain::{Adf04Result, Document, TransitionKey};
use serde::Serialize;
use std::collections::HashMap;

/// Leading rows of the reference export that carry column titles, not data.
pub const REFERENCE_HEADER_LINES: usize = 3;
const A_VALUE_COLUMN: usize = 3;
const ENERGY_PAIR_COLUMN: usize = 4;

/// One row of the external reference dataset: the transition's two energy
/// values and its A-coefficient, all kept as formatted text because the
/// cross-match is textual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub lower_energy: String,
    pub higher_energy: String,
    pub a_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedReferenceRow {
    pub line: usize,
    pub reason: String,
}

/// Parsed reference dataset. Rows that cannot be interpreted are flagged
/// here instead of being silently dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceDataset {
    pub records: Vec<ReferenceRecord>,
    pub malformed: Vec<MalformedReferenceRow>,
}

/// Parses the comma-separated reference export. The first three lines are
/// headers; data rows carry the A-value in column 3 (with its `E` exponent
/// marker stripped) and the energy pair in column 4 as
/// `<higher> - <lower>` around a whitespace-padded hyphen.
pub fn parse_reference_dataset(source: &str) -> ReferenceDataset {
    let mut dataset = ReferenceDataset::default();
    for (offset, line) in source.lines().enumerate().skip(REFERENCE_HEADER_LINES) {
        let number = offset + 1;
        if !line.chars().any(|character| character.is_ascii_digit()) {
            continue;
        }
        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() <= ENERGY_PAIR_COLUMN {
            dataset.malformed.push(MalformedReferenceRow {
                line: number,
                reason: format!(
                    "row has {} columns, expected at least {}",
                    columns.len(),
                    ENERGY_PAIR_COLUMN + 1
                ),
            });
            continue;
        }
        let Some((higher, lower)) = split_energy_pair(columns[ENERGY_PAIR_COLUMN]) else {
            dataset.malformed.push(MalformedReferenceRow {
                line: number,
                reason: format!(
                    "energy column '{}' is not '<higher> - <lower>'",
                    columns[ENERGY_PAIR_COLUMN]
                ),
            });
            continue;
        };
        dataset.records.push(ReferenceRecord {
            lower_energy: lower.to_string(),
            higher_energy: higher.to_string(),
            a_value: columns[A_VALUE_COLUMN].replace('E', ""),
        });
    }
    dataset
}

/// Splits `<higher> - <lower>` on the first hyphen padded by whitespace on
/// both sides, so negative signs inside the values are never separators.
fn split_energy_pair(column: &str) -> Option<(&str, &str)> {
    let mut search = 0;
    while let Some(offset) = column[search..].find('-') {
        let position = search + offset;
        let before = &column[..position];
        let after = &column[position + 1..];
        let higher = before.trim_end();
        let lower = after.trim_start();
        if higher.len() < before.len() && lower.len() < after.len() && !higher.is_empty() {
            return Some((higher, lower));
        }
        search = position + 1;
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossMatchMode {
    /// Emit the document's existing A-value for auditing against the
    /// reference.
    Comparison,
    /// Emit the reference A-value, to be spliced over the document column.
    Substitution,
}

/// Per-record cross-match result. A failed lookup is an expected,
/// reportable outcome, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CrossMatchOutcome {
    Matched { key: String, a_value: String },
    MissingLowerEnergy { lower_energy: String },
    MissingHigherEnergy { higher_energy: String },
    MissingTransition { key: String },
}

/// Matches every reference record against the document by exact textual
/// equality of energy values, resolving level indices by 1-based table
/// position. Processing always covers the whole dataset; gaps are emitted
/// as missing outcomes.
pub fn cross_match(
    document: &Document,
    dataset: &ReferenceDataset,
    mode: CrossMatchMode,
) -> Adf04Result<Vec<CrossMatchOutcome>> {
    let mut outcomes = Vec::with_capacity(dataset.records.len());
    for record in &dataset.records {
        let Some(lower_position) = document.levels.position_of_energy(&record.lower_energy)
        else {
            outcomes.push(CrossMatchOutcome::MissingLowerEnergy {
                lower_energy: record.lower_energy.clone(),
            });
            continue;
        };
        let Some(higher_position) = document.levels.position_of_energy(&record.higher_energy)
        else {
            outcomes.push(CrossMatchOutcome::MissingHigherEnergy {
                higher_energy: record.higher_energy.clone(),
            });
            continue;
        };
        let key = TransitionKey::new(lower_position.to_string(), higher_position.to_string());
        let packed = key.packed()?;
        match document.rates.get(&key) {
            Some(rate) => {
                let a_value = match mode {
                    CrossMatchMode::Comparison => rate.a_text().to_string(),
                    CrossMatchMode::Substitution => record.a_value.clone(),
                };
                outcomes.push(CrossMatchOutcome::Matched {
                    key: packed,
                    a_value,
                });
            }
            None => outcomes.push(CrossMatchOutcome::MissingTransition { key: packed }),
        }
    }
    Ok(outcomes)
}

/// Builds the substituted A-coefficient column: one value per transition in
/// document order, taking the reference A-value wherever a record resolves
/// to that transition and the existing value everywhere else. The first
/// reference record to resolve to a transition wins.
pub fn substituted_a_column(
    document: &Document,
    dataset: &ReferenceDataset,
) -> Vec<String> {
    let mut replacements: HashMap<TransitionKey, String> = HashMap::new();
    for record in &dataset.records {
        let Some(lower_position) = document.levels.position_of_energy(&record.lower_energy)
        else {
            continue;
        };
        let Some(higher_position) = document.levels.position_of_energy(&record.higher_energy)
        else {
            continue;
        };
        let key = TransitionKey::new(lower_position.to_string(), higher_position.to_string());
        replacements.entry(key).or_insert_with(|| record.a_value.clone());
    }

    document
        .rates
        .iter()
        .map(|(key, record)| {
            replacements
                .get(key)
                .cloned()
                .unwrap_or_else(|| record.a_text().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        cross_match, parse_reference_dataset, substituted_a_column, CrossMatchMode,
        CrossMatchOutcome,
    };
    use crate::modules::parse::parse_document;

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

    const REFERENCE: &str = "observed spectral lines\n\
exported search results\n\
obs_wl,ritz_wl,unc,Aki,levels\n\
a,b,c,1.23E+08,169087.0 - 159856.0\n\
a,b,c,4.56E+07,999999.0 - 159856.0\n\
a,b,c,7.89E+06,169087.0 - 777777.0\n";

    #[test]
    fn reference_rows_parse_with_stripped_exponent_markers() {
        let dataset = parse_reference_dataset(REFERENCE);
        assert_eq!(dataset.records.len(), 3);
        assert!(dataset.malformed.is_empty());
        let first = &dataset.records[0];
        assert_eq!(first.a_value, "1.23+08");
        assert_eq!(first.higher_energy, "169087.0");
        assert_eq!(first.lower_energy, "159856.0");
    }

    #[test]
    fn malformed_reference_rows_are_flagged_not_dropped() {
        let source = "h1\nh2\nh3\na,b,c,1.23E+08\na,b,c,4.56E+07,169087.0_159856.0\n";
        let dataset = parse_reference_dataset(source);
        assert!(dataset.records.is_empty());
        assert_eq!(dataset.malformed.len(), 2);
        assert_eq!(dataset.malformed[0].line, 4);
        assert_eq!(dataset.malformed[1].line, 5);
    }

    #[test]
    fn matching_energies_resolve_to_positional_transition_keys() {
        let document = parse_document(SAMPLE).expect("sample should parse");
        let dataset = parse_reference_dataset(REFERENCE);
        let outcomes = cross_match(&document, &dataset, CrossMatchMode::Comparison)
            .expect("cross-match should succeed");

        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes[0],
            CrossMatchOutcome::Matched {
                key: "2   3".to_string(),
                a_value: "1.00-30".to_string(),
            }
        );
        assert_eq!(
            outcomes[1],
            CrossMatchOutcome::MissingHigherEnergy {
                higher_energy: "999999.0".to_string(),
            }
        );
        assert_eq!(
            outcomes[2],
            CrossMatchOutcome::MissingLowerEnergy {
                lower_energy: "777777.0".to_string(),
            }
        );
    }

    #[test]
    fn substitution_mode_emits_the_reference_a_value() {
        let document = parse_document(SAMPLE).expect("sample should parse");
        let dataset = parse_reference_dataset(REFERENCE);
        let outcomes = cross_match(&document, &dataset, CrossMatchMode::Substitution)
            .expect("cross-match should succeed");
        assert_eq!(
            outcomes[0],
            CrossMatchOutcome::Matched {
                key: "2   3".to_string(),
                a_value: "1.23+08".to_string(),
            }
        );
    }

    #[test]
    fn substituted_column_splices_reference_values_in_table_order() {
        let document = parse_document(SAMPLE).expect("sample should parse");
        let dataset = parse_reference_dataset(REFERENCE);
        let column = substituted_a_column(&document, &dataset);
        assert_eq!(column, vec!["2.50-01", "5.00-02", "1.23+08"]);
    }

    #[test]
    fn unmatched_records_leave_the_output_table_alone() {
        let document = parse_document(SAMPLE).expect("sample should parse");
        let dataset =
            parse_reference_dataset("h1\nh2\nh3\na,b,c,4.56E+07,999999.0 - 888888.0\n");
        let column = substituted_a_column(&document, &dataset);
        assert_eq!(column, vec!["2.50-01", "5.00-02", "1.00-30"]);
    }
}
