//! Reference-table domain models.
//!
//! The master reference dataset is loaded once into a `ReferenceTable`,
//! an immutable lookup keyed by canonical part number. Rows from an
//! uploaded sheet are reconciled against it and never mutate it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Canonical form of a part number: trimmed, uppercased.
///
/// Both the reference loader and the reconciler key through this, so a
/// part that appears as ` ab-100 ` in an upload still finds `AB-100`.
pub fn canonical_part_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A single entry from the master reference dataset.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ReferenceEntry {
    #[validate(length(min = 1, max = 100, message = "Part number must be between 1 and 100 characters"))]
    pub part_number: String,
    /// Expected attribute values keyed by canonical column name
    /// (e.g. `description`, `quantity`, `category`).
    pub attributes: HashMap<String, String>,
}

impl ReferenceEntry {
    pub fn new(part_number: impl Into<String>) -> Self {
        Self {
            part_number: part_number.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Expected value for an attribute, if the reference carries one.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Immutable mapping from canonical part number to reference entry.
///
/// Built once per load by the reference loader; read-only afterwards.
/// Duplicate part numbers in the source overwrite earlier entries
/// (last-seen-wins), which `insert` surfaces by returning the displaced
/// entry so the loader can log it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceTable {
    entries: HashMap<String, ReferenceEntry>,
    attribute_names: Vec<String>,
}

impl ReferenceTable {
    /// `attribute_names` are the canonical tracked-attribute columns of
    /// the source, in column order.
    pub fn new(attribute_names: Vec<String>) -> Self {
        Self {
            entries: HashMap::new(),
            attribute_names,
        }
    }

    /// Insert an entry under its canonical part number, returning the
    /// entry it displaced if the part number was already present.
    pub fn insert(&mut self, entry: ReferenceEntry) -> Option<ReferenceEntry> {
        let key = canonical_part_number(&entry.part_number);
        self.entries.insert(key, entry)
    }

    /// Look up by part number in any casing/spacing.
    pub fn get(&self, part_number: &str) -> Option<&ReferenceEntry> {
        self.entries.get(&canonical_part_number(part_number))
    }

    pub fn contains(&self, part_number: &str) -> bool {
        self.get(part_number).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical tracked-attribute column names of the source.
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let mut table = ReferenceTable::new(vec!["quantity".to_string()]);
        table.insert(ReferenceEntry::new("AB-100").with_attribute("quantity", "10"));

        assert!(table.contains(" ab-100 "));
        assert_eq!(table.get("ab-100").unwrap().attribute("quantity"), Some("10"));
        assert!(!table.contains("AB-101"));
    }

    #[test]
    fn insert_reports_displaced_entry() {
        let mut table = ReferenceTable::new(vec![]);
        assert!(table.insert(ReferenceEntry::new("AB-100")).is_none());

        let displaced = table.insert(ReferenceEntry::new("ab-100"));
        assert_eq!(displaced.unwrap().part_number, "AB-100");
        assert_eq!(table.len(), 1);
    }
}
