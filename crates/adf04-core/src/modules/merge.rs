use crate::domain::{Adf04Result, LevelTable, RateTable, TermComposite};
use serde::Serialize;
use std::collections::HashMap;

/// Reserved A-value text meaning "no measured rate".
pub const A_VALUE_PLACEHOLDER: &str = "1.00-30";
/// Reserved infinite-energy text meaning "no data"; compared on the value
/// part so the field's leading pad does not matter.
pub const INFINITE_POINT_PLACEHOLDER: &str = "0.00+00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Overlay wins wherever it has the key.
    OverwriteAll,
    /// Overlay only fills base values equal to the placeholder sentinel, so
    /// a higher-fidelity dataset patches gaps without disturbing trusted
    /// values.
    FillPlaceholdersOnly,
}

/// Completeness summary for one merge pass. Keys missing from the overlay
/// are gaps to report, not errors; the merge always runs to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub total: usize,
    pub replaced: usize,
    pub kept: usize,
    pub missing_in_overlay: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub column: Vec<String>,
    pub report: MergeReport,
}

/// Merges the A-coefficient column of `overlay` into `base`, producing one
/// value per base key in base order.
pub fn merge_a_coefficients(
    base: &RateTable,
    overlay: &RateTable,
    mode: MergeMode,
) -> Adf04Result<MergeOutcome> {
    merge_column(base, overlay, mode, |record| record.a_text().to_string(), |record| {
        record.a_text() == A_VALUE_PLACEHOLDER
    })
}

/// Same contract as [`merge_a_coefficients`] for the trailing
/// infinite-energy field, which carries its own placeholder convention.
pub fn merge_infinite_points(
    base: &RateTable,
    overlay: &RateTable,
    mode: MergeMode,
) -> Adf04Result<MergeOutcome> {
    merge_column(
        base,
        overlay,
        mode,
        |record| record.infinite_point().to_string(),
        |record| record.infinite_point().ends_with(INFINITE_POINT_PLACEHOLDER),
    )
}

fn merge_column(
    base: &RateTable,
    overlay: &RateTable,
    mode: MergeMode,
    extract: impl Fn(&crate::domain::RateRecord) -> String,
    is_placeholder: impl Fn(&crate::domain::RateRecord) -> bool,
) -> Adf04Result<MergeOutcome> {
    let mut column = Vec::with_capacity(base.len());
    let mut report = MergeReport {
        total: base.len(),
        ..MergeReport::default()
    };

    for (key, record) in base.iter() {
        match overlay.get(key) {
            Some(other) => {
                let take_overlay = match mode {
                    MergeMode::OverwriteAll => true,
                    MergeMode::FillPlaceholdersOnly => is_placeholder(record),
                };
                if take_overlay {
                    column.push(extract(other));
                    report.replaced += 1;
                } else {
                    column.push(extract(record));
                    report.kept += 1;
                }
            }
            None => {
                column.push(extract(record));
                report.kept += 1;
                report.missing_in_overlay.push(key.packed()?);
            }
        }
    }

    Ok(MergeOutcome { column, report })
}

/// Walks levels in table order and numbers distinct term composites from 1
/// in first-occurrence order; repeated composites reuse their number.
pub fn assign_term_groups(
    levels: &LevelTable,
    composite: TermComposite,
) -> Adf04Result<Vec<u32>> {
    let mut groups = Vec::with_capacity(levels.len());
    let mut seen: HashMap<String, u32> = HashMap::new();
    for entry in levels.iter() {
        let key = entry.term_composite(composite)?;
        let next = seen.len() as u32 + 1;
        let group = *seen.entry(key).or_insert(next);
        groups.push(group);
    }
    Ok(groups)
}
