pub mod errors;

pub use errors::{Adf04Error, Adf04ErrorCategory, Adf04Result, ParserResult};

use crate::common::units::EnergyUnit;
use std::collections::HashMap;

/// First line of an ADF04 file plus the fields extracted from it. The raw
/// line is kept verbatim so serialization can reproduce it byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub raw_line: String,
    pub charge: i32,
    pub atomic_number: i32,
    pub ionization_potential: f64,
    pub potential_unit: EnergyUnit,
}

/// Which trailing descriptor tokens form the term-grouping composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermComposite {
    TwoToken,
    ThreeToken,
}

/// One atomic energy level: the file's native string index, the opaque
/// descriptor text (term notation, statistical weights, trailing energy
/// value), and the verbatim source text for round-trip output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelEntry {
    index: String,
    descriptor: String,
    raw: String,
}

impl LevelEntry {
    pub fn new(
        index: impl Into<String>,
        descriptor: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            descriptor: descriptor.into(),
            raw: raw.into(),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Trailing energy token of the descriptor, exactly as formatted in the
    /// file. Matching against reference datasets is textual, not numeric.
    pub fn energy_text(&self) -> Option<&str> {
        self.descriptor.split_whitespace().last()
    }

    /// Composite term key built from the trailing descriptor tokens. The
    /// last token is the energy and the one before it the J value; the
    /// composite concatenates the two or three tokens before those.
    pub fn term_composite(&self, composite: TermComposite) -> Adf04Result<String> {
        let tokens: Vec<&str> = self.descriptor.split_whitespace().collect();
        let needed = match composite {
            TermComposite::TwoToken => 4,
            TermComposite::ThreeToken => 5,
        };
        if tokens.len() < needed {
            return Err(Adf04Error::format(
                "FORMAT.TERM_TOKENS",
                format!(
                    "level {} descriptor '{}' has {} tokens, need {} for term grouping",
                    self.index,
                    self.descriptor,
                    tokens.len(),
                    needed
                ),
            ));
        }
        let n = tokens.len();
        let term = tokens[n - 3].trim_matches('(');
        Ok(match composite {
            TermComposite::TwoToken => format!("{}{}", tokens[n - 4], term),
            TermComposite::ThreeToken => format!("{}{}{}", tokens[n - 5], tokens[n - 4], term),
        })
    }
}

/// Insertion-ordered level table with unique string indices. Order defines
/// the positional level numbering used by energy lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelTable {
    entries: Vec<LevelEntry>,
    index_lookup: HashMap<String, usize>,
}

impl LevelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: LevelEntry) -> Adf04Result<()> {
        if self.index_lookup.contains_key(entry.index()) {
            return Err(Adf04Error::parse(
                "PARSE.DUPLICATE_LEVEL",
                format!("level index '{}' appears more than once", entry.index()),
            ));
        }
        self.index_lookup
            .insert(entry.index().to_string(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, index: &str) -> Option<&LevelEntry> {
        self.index_lookup
            .get(index)
            .map(|position| &self.entries[*position])
    }

    pub fn contains_index(&self, index: &str) -> bool {
        self.index_lookup.contains_key(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelEntry> {
        self.entries.iter()
    }

    /// 1-based position of the first level whose trailing energy text equals
    /// `energy_text`. Duplicate energies resolve to the first occurrence;
    /// callers that need stricter behavior must check for duplicates
    /// themselves.
    pub fn position_of_energy(&self, energy_text: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.energy_text() == Some(energy_text))
            .map(|position| position + 1)
    }
}

/// Temperature grid tokens plus the verbatim line they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemperatureGrid {
    raw_line: String,
    temperatures: Vec<String>,
}

impl TemperatureGrid {
    pub fn new(raw_line: impl Into<String>, temperatures: Vec<String>) -> Self {
        Self {
            raw_line: raw_line.into(),
            temperatures,
        }
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    pub fn temperatures(&self) -> &[String] {
        &self.temperatures
    }

    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }
}

/// Separator width between the two key indices, keyed on their combined
/// digit count. The consuming programs read these files by column position,
/// so the widths are part of the format contract, not cosmetics.
const KEY_SEPARATOR_TABLE: [(usize, usize, &str); 3] =
    [(2, 3, "   "), (4, 5, "  "), (6, 8, " ")];

pub fn key_separator(combined_len: usize) -> Adf04Result<&'static str> {
    KEY_SEPARATOR_TABLE
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&combined_len))
        .map(|(_, _, separator)| *separator)
        .ok_or_else(|| {
            Adf04Error::format(
                "FORMAT.KEY_WIDTH",
                format!("combined key width {combined_len} has no separator rule"),
            )
        })
}

/// Ordered (lower, upper) level-index pair identifying one transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    lower: String,
    upper: String,
}

impl TransitionKey {
    pub fn new(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn upper(&self) -> &str {
        &self.upper
    }

    pub fn combined_len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    /// Serialized key text with the width-dependent separator.
    pub fn packed(&self) -> Adf04Result<String> {
        let separator = key_separator(self.combined_len())?;
        Ok(format!("{}{}{}", self.lower, separator, self.upper))
    }
}

/// Rate coefficients for one transition. Tokens are kept verbatim next to
/// their parsed values so untouched columns re-serialize byte for byte. The
/// trailing infinite-energy field keeps its fixed 8-character text form and
/// never passes through generic numeric parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    a_text: String,
    a_value: f64,
    collisional_text: Vec<String>,
    collisional: Vec<f64>,
    infinite_point: String,
}

impl RateRecord {
    pub fn new(
        a_text: impl Into<String>,
        a_value: f64,
        collisional_text: Vec<String>,
        collisional: Vec<f64>,
        infinite_point: impl Into<String>,
    ) -> Self {
        Self {
            a_text: a_text.into(),
            a_value,
            collisional_text,
            collisional,
            infinite_point: infinite_point.into(),
        }
    }

    pub fn a_text(&self) -> &str {
        &self.a_text
    }

    pub fn a_value(&self) -> f64 {
        self.a_value
    }

    pub fn collisional_text(&self) -> &[String] {
        &self.collisional_text
    }

    pub fn collisional(&self) -> &[f64] {
        &self.collisional
    }

    pub fn infinite_point(&self) -> &str {
        &self.infinite_point
    }
}

/// Insertion-ordered transition table with unique keys; file order is
/// preserved for re-serialization and positional lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rows: Vec<(TransitionKey, RateRecord)>,
    key_lookup: HashMap<TransitionKey, usize>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: TransitionKey, record: RateRecord) -> Adf04Result<()> {
        if self.key_lookup.contains_key(&key) {
            return Err(Adf04Error::parse(
                "PARSE.DUPLICATE_TRANSITION",
                format!(
                    "transition ({}, {}) appears more than once",
                    key.lower(),
                    key.upper()
                ),
            ));
        }
        self.key_lookup.insert(key.clone(), self.rows.len());
        self.rows.push((key, record));
        Ok(())
    }

    pub fn get(&self, key: &TransitionKey) -> Option<&RateRecord> {
        self.key_lookup
            .get(key)
            .map(|position| &self.rows[*position].1)
    }

    pub fn contains_key(&self, key: &TransitionKey) -> bool {
        self.key_lookup.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TransitionKey, &RateRecord)> {
        self.rows.iter().map(|(key, record)| (key, record))
    }
}

/// A fully parsed ADF04 file. Constructed once by the parser; downstream
/// engines read it immutably and build new tables instead of mutating it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub header: Header,
    pub levels: LevelTable,
    pub temperatures: TemperatureGrid,
    pub rates: RateTable,
}

#[cfg(test)]
mod tests {
    use super::{
        key_separator, LevelEntry, LevelTable, RateRecord, RateTable, TermComposite, TransitionKey,
    };

    #[test]
    fn key_separator_switches_exactly_at_width_thresholds() {
        let cases = [
            ("9", "9", "9   9"),
            ("9", "99", "9   99"),
            ("10", "9", "10   9"),
            ("99", "99", "99  99"),
            ("100", "10", "100  10"),
            ("999", "9999", "999 9999"),
            ("9999", "9999", "9999 9999"),
        ];
        for (lower, upper, expected) in cases {
            let packed = TransitionKey::new(lower, upper)
                .packed()
                .expect("packing should succeed inside the width table");
            assert_eq!(packed, expected);
        }
    }

    #[test]
    fn key_separator_rejects_widths_outside_the_table() {
        let error = key_separator(9).expect_err("width 9 should have no rule");
        assert_eq!(error.code(), "FORMAT.KEY_WIDTH");
        let error = TransitionKey::new("10000", "10000")
            .packed()
            .expect_err("ten-digit keys should have no rule");
        assert_eq!(error.code(), "FORMAT.KEY_WIDTH");
    }

    #[test]
    fn level_table_rejects_duplicate_indices() {
        let mut table = LevelTable::new();
        table
            .insert(LevelEntry::new("1", "2S1 (2)0( 0.5) 0.0", "   1 ..."))
            .expect("first insert should succeed");
        let error = table
            .insert(LevelEntry::new("1", "2P1 (2)1( 0.5) 10.0", "   1 ..."))
            .expect_err("duplicate index should be rejected");
        assert_eq!(error.code(), "PARSE.DUPLICATE_LEVEL");
    }

    #[test]
    fn energy_lookup_is_positional_and_first_match_wins() {
        let mut table = LevelTable::new();
        for (index, energy) in [("1", "0.0"), ("2", "100.0"), ("3", "100.0")] {
            table
                .insert(LevelEntry::new(
                    index,
                    format!("2S1 2P1 (3)1( 1.0) {energy}"),
                    String::new(),
                ))
                .expect("insert should succeed");
        }
        assert_eq!(table.position_of_energy("0.0"), Some(1));
        // duplicate energy resolves to the first occurrence by design
        assert_eq!(table.position_of_energy("100.0"), Some(2));
        assert_eq!(table.position_of_energy("999.0"), None);
    }

    #[test]
    fn term_composites_concatenate_trailing_tokens() {
        let entry = LevelEntry::new("4", "1S1 2S1 (3)1( 1.0) 159856.0", String::new());
        let three = entry
            .term_composite(TermComposite::ThreeToken)
            .expect("descriptor should have enough tokens");
        assert_eq!(three, "1S12S13)1");
        let two = entry
            .term_composite(TermComposite::TwoToken)
            .expect("descriptor should have enough tokens");
        assert_eq!(two, "2S13)1");
    }

    #[test]
    fn term_composite_reports_short_descriptors() {
        let entry = LevelEntry::new("1", "(3)1( 1.0) 0.0", String::new());
        let error = entry
            .term_composite(TermComposite::ThreeToken)
            .expect_err("four tokens should be too few for the three-token key");
        assert_eq!(error.code(), "FORMAT.TERM_TOKENS");
    }

    #[test]
    fn rate_table_preserves_insertion_order() {
        let mut table = RateTable::new();
        let keys = [("2", "1"), ("3", "1"), ("3", "2")];
        for (lower, upper) in keys {
            table
                .insert(
                    TransitionKey::new(lower, upper),
                    RateRecord::new("1.00-30", 1.0e-30, Vec::new(), Vec::new(), " 0.00+00"),
                )
                .expect("insert should succeed");
        }
        let order: Vec<(String, String)> = table
            .iter()
            .map(|(key, _)| (key.lower().to_string(), key.upper().to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2".to_string(), "1".to_string()),
                ("3".to_string(), "1".to_string()),
                ("3".to_string(), "2".to_string()),
            ]
        );
        assert!(table.contains_key(&TransitionKey::new("3", "2")));
        assert!(!table.contains_key(&TransitionKey::new("1", "2")));
    }
}
