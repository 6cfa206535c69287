use crate::domain::{
    Adf04Error, Adf04Result, LevelEntry, LevelTable, RateTable, TransitionKey,
};
use std::collections::{BTreeMap, BTreeSet};

/// Caller-supplied bijection renumbering level indices, old index to new.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelPermutation {
    mapping: BTreeMap<u32, u32>,
}

impl LevelPermutation {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, u32)>) -> Adf04Result<Self> {
        let mut mapping = BTreeMap::new();
        for (old, new) in pairs {
            if mapping.insert(old, new).is_some() {
                return Err(Adf04Error::remap(
                    "REMAP.DUPLICATE_SOURCE",
                    format!("old index {old} is mapped more than once"),
                ));
            }
        }
        Ok(Self { mapping })
    }

    pub fn get(&self, old: u32) -> Option<u32> {
        self.mapping.get(&old).copied()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn inverse(&self) -> Adf04Result<Self> {
        let mut inverted = BTreeMap::new();
        for (old, new) in &self.mapping {
            if inverted.insert(*new, *old).is_some() {
                return Err(Adf04Error::remap(
                    "REMAP.NOT_BIJECTIVE",
                    format!("new index {new} is the target of more than one old index"),
                ));
            }
        }
        Ok(Self { mapping: inverted })
    }

    /// The permutation must be a total bijection over exactly the given
    /// index domain; anything less would silently drop or collide levels.
    pub fn validate_over(&self, domain: &[u32]) -> Adf04Result<()> {
        let domain_set: BTreeSet<u32> = domain.iter().copied().collect();
        let missing: Vec<u32> = domain_set
            .iter()
            .filter(|index| !self.mapping.contains_key(index))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Adf04Error::remap(
                "REMAP.NOT_TOTAL",
                format!("permutation has no target for level indices {missing:?}"),
            ));
        }
        if self.mapping.len() != domain_set.len() {
            let extra: Vec<u32> = self
                .mapping
                .keys()
                .filter(|index| !domain_set.contains(index))
                .copied()
                .collect();
            return Err(Adf04Error::remap(
                "REMAP.NOT_TOTAL",
                format!("permutation maps indices outside the level domain: {extra:?}"),
            ));
        }
        let image: BTreeSet<u32> = self.mapping.values().copied().collect();
        if image != domain_set {
            return Err(Adf04Error::remap(
                "REMAP.NOT_BIJECTIVE",
                "permutation image does not cover the level domain exactly",
            ));
        }
        Ok(())
    }
}

fn numeric_index(index: &str) -> Adf04Result<u32> {
    index.parse::<u32>().map_err(|_| {
        Adf04Error::remap(
            "REMAP.INDEX_NOT_NUMERIC",
            format!("index '{index}' cannot be renumbered"),
        )
    })
}

/// Re-keys every level through the permutation, zero-padding single-digit
/// targets to two digits, and returns the table sorted by the new index so
/// positional numbering matches the new keys. The input table is untouched.
pub fn remap_levels(
    levels: &LevelTable,
    permutation: &LevelPermutation,
) -> Adf04Result<LevelTable> {
    let mut domain = Vec::with_capacity(levels.len());
    for entry in levels.iter() {
        domain.push(numeric_index(entry.index())?);
    }
    permutation.validate_over(&domain)?;

    let mut renumbered: Vec<(u32, LevelEntry)> = Vec::with_capacity(levels.len());
    for entry in levels.iter() {
        let old = numeric_index(entry.index())?;
        let target = permutation.get(old).ok_or_else(|| {
            Adf04Error::remap(
                "REMAP.DANGLING_REFERENCE",
                format!("level index {old} has no target"),
            )
        })?;
        let new_index = format!("{target:02}");
        let raw = format!("{:>5} {}", new_index, entry.descriptor());
        renumbered.push((
            target,
            LevelEntry::new(new_index, entry.descriptor(), raw),
        ));
    }
    renumbered.sort_by_key(|(target, _)| *target);

    let mut table = LevelTable::new();
    for (_, entry) in renumbered {
        table.insert(entry).map_err(|error| {
            Adf04Error::remap("REMAP.NOT_BIJECTIVE", error.message().to_string())
        })?;
    }
    Ok(table)
}

/// Maps both endpoints of every transition key and re-derives the packed
/// separator from the new combined digit length. Records are copied
/// unchanged and table order is preserved.
pub fn remap_transitions(
    rates: &RateTable,
    permutation: &LevelPermutation,
) -> Adf04Result<RateTable> {
    let mut table = RateTable::new();
    for (key, record) in rates.iter() {
        let mut endpoints = [0_u32; 2];
        for (slot, index) in endpoints.iter_mut().zip([key.lower(), key.upper()]) {
            let old = numeric_index(index)?;
            *slot = permutation.get(old).ok_or_else(|| {
                Adf04Error::remap(
                    "REMAP.DANGLING_REFERENCE",
                    format!(
                        "transition ({}, {}) references index {} outside the permutation domain",
                        key.lower(),
                        key.upper(),
                        old
                    ),
                )
            })?;
        }
        let new_key = TransitionKey::new(endpoints[0].to_string(), endpoints[1].to_string());
        table.insert(new_key, record.clone()).map_err(|error| {
            Adf04Error::remap("REMAP.NOT_BIJECTIVE", error.message().to_string())
        })?;
    }
    Ok(table)
}
