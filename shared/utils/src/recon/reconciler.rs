//! Row Reconciler
//!
//! Classifies each uploaded row against the reference table in a single
//! ordered pass. Row-level anomalies never abort the pass; they only
//! downgrade that row's classification.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use bomline_models::{
    canonical_part_number, ReferenceEntry, ReferenceTable, RowCategory, RowClassification,
    UploadedRow,
};

use crate::config::ReconciliationSettings;
use crate::error::BomlineResult;

/// Part numbers: alphanumeric start, then alphanumerics and common
/// separators.
pub const DEFAULT_KEY_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._/-]*$";

/// Immutable configuration for one reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Rows whose part number fails this pattern classify as malformed.
    pub key_pattern: Regex,
    /// Absolute tolerance when both compared values parse as numbers.
    pub numeric_tolerance: f64,
    /// Attributes to compare; `None` compares everything the reference
    /// entry carries, in reference column order.
    pub tracked_fields: Option<Vec<String>>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            key_pattern: Regex::new(DEFAULT_KEY_PATTERN).unwrap(),
            numeric_tolerance: 1e-6,
            tracked_fields: None,
        }
    }
}

impl ReconcilerConfig {
    pub fn from_settings(settings: &ReconciliationSettings) -> BomlineResult<Self> {
        Ok(Self {
            key_pattern: Regex::new(&settings.key_pattern)?,
            numeric_tolerance: settings.numeric_tolerance,
            tracked_fields: settings.tracked_fields.clone(),
        })
    }
}

/// Classifies uploaded rows against a reference table snapshot.
pub struct RowReconciler {
    reference: Arc<ReferenceTable>,
    config: ReconcilerConfig,
}

impl RowReconciler {
    pub fn new(reference: Arc<ReferenceTable>, config: ReconcilerConfig) -> Self {
        Self { reference, config }
    }

    /// One classification per row, preserving input order. Single pass;
    /// duplicates are detected relative to iteration order, and the
    /// first occurrence is never revisited.
    pub fn classify_all(&self, rows: &[UploadedRow]) -> Vec<RowClassification> {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        rows.iter()
            .map(|row| self.classify(row, &mut first_seen))
            .collect()
    }

    fn classify(
        &self,
        row: &UploadedRow,
        first_seen: &mut HashMap<String, usize>,
    ) -> RowClassification {
        let part_number = match row.part_number.as_deref().map(str::trim) {
            Some(pn) if !pn.is_empty() => pn,
            _ => {
                return RowClassification::new(
                    row.row_index,
                    RowCategory::MalformedKey,
                    "part number is blank",
                )
            }
        };

        if !self.config.key_pattern.is_match(part_number) {
            return RowClassification::new(
                row.row_index,
                RowCategory::MalformedKey,
                format!("part number '{part_number}' does not match the expected format"),
            );
        }

        let key = canonical_part_number(part_number);
        let entry = match self.reference.get(&key) {
            Some(entry) => entry,
            None => {
                return RowClassification::new(
                    row.row_index,
                    RowCategory::MissingFromReference,
                    format!("part number '{part_number}' is not in the reference table"),
                )
            }
        };

        let mismatches = self.compare_fields(row, entry);
        if !mismatches.is_empty() {
            // Mismatch rows still count as the key's first occurrence.
            first_seen.entry(key).or_insert(row.row_index);
            return RowClassification::new(
                row.row_index,
                RowCategory::FieldMismatch,
                mismatches.join("; "),
            );
        }

        if let Some(&first) = first_seen.get(&key) {
            return RowClassification::new(
                row.row_index,
                RowCategory::Duplicate,
                format!("duplicate of row {first}"),
            );
        }

        first_seen.insert(key, row.row_index);
        RowClassification::matched(row.row_index)
    }

    /// Mismatch descriptions for every tracked attribute that differs,
    /// in reference column order.
    fn compare_fields(&self, row: &UploadedRow, entry: &ReferenceEntry) -> Vec<String> {
        let fields: Vec<&str> = match &self.config.tracked_fields {
            Some(tracked) => tracked.iter().map(String::as_str).collect(),
            None => self
                .reference
                .attribute_names()
                .iter()
                .map(String::as_str)
                .collect(),
        };

        let mut mismatches = Vec::new();
        for field in fields {
            let expected = match entry.attribute(field) {
                Some(value) => value,
                None => continue,
            };
            let found = row.value(field).unwrap_or("");
            if !self.values_equal(expected, found) {
                mismatches.push(format!(
                    "{field}: expected {}, found {}",
                    display_value(expected),
                    display_value(found)
                ));
            }
        }
        mismatches
    }

    fn values_equal(&self, expected: &str, found: &str) -> bool {
        let expected = normalize_text(expected);
        let found = normalize_text(found);

        if let (Ok(a), Ok(b)) = (expected.parse::<f64>(), found.parse::<f64>()) {
            (a - b).abs() <= self.config.numeric_tolerance
        } else {
            expected == found
        }
    }
}

/// Case-insensitive, whitespace-collapsed comparison form.
fn normalize_text(value: &str) -> String {
    let lower = value.to_lowercase();
    lower.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn display_value(value: &str) -> String {
    if value.trim().is_empty() {
        "(blank)".to_string()
    } else {
        format!("'{value}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(entries: &[(&str, &[(&str, &str)])]) -> Arc<ReferenceTable> {
        let attribute_names = entries
            .first()
            .map(|(_, attrs)| attrs.iter().map(|(k, _)| k.to_string()).collect())
            .unwrap_or_default();
        let mut table = ReferenceTable::new(attribute_names);
        for (pn, attrs) in entries {
            let mut entry = ReferenceEntry::new(*pn);
            for (k, v) in *attrs {
                entry.attributes.insert(k.to_string(), v.to_string());
            }
            table.insert(entry);
        }
        Arc::new(table)
    }

    fn row(index: usize, pn: &str, attrs: &[(&str, &str)]) -> UploadedRow {
        let part_number = if pn.is_empty() { None } else { Some(pn.to_string()) };
        let mut row = UploadedRow::new(index, part_number);
        for (k, v) in attrs {
            row.values.insert(k.to_string(), v.to_string());
        }
        row
    }

    fn reconciler(reference: Arc<ReferenceTable>) -> RowReconciler {
        RowReconciler::new(reference, ReconcilerConfig::default())
    }

    #[test]
    fn matching_row_is_matched() {
        let reconciler = reconciler(reference(&[("A1", &[("quantity", "10")])]));
        let out = reconciler.classify_all(&[row(0, "A1", &[("quantity", "10")])]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, RowCategory::Matched);
    }

    #[test]
    fn differing_quantity_is_a_field_mismatch() {
        let reconciler = reconciler(reference(&[("A1", &[("quantity", "10")])]));
        let out = reconciler.classify_all(&[row(0, "A1", &[("quantity", "5")])]);

        assert_eq!(out[0].category, RowCategory::FieldMismatch);
        assert!(out[0].reason.contains("quantity"));
        assert!(out[0].reason.contains("'10'"));
        assert!(out[0].reason.contains("'5'"));
    }

    #[test]
    fn unknown_part_is_missing_from_reference() {
        let reconciler = reconciler(Arc::new(ReferenceTable::new(vec!["quantity".to_string()])));
        let out = reconciler.classify_all(&[row(0, "A1", &[("quantity", "10")])]);

        assert_eq!(out[0].category, RowCategory::MissingFromReference);
    }

    #[test]
    fn repeated_clean_rows_become_duplicates() {
        let reconciler = reconciler(reference(&[("A1", &[("quantity", "10")])]));
        let out = reconciler.classify_all(&[
            row(0, "A1", &[("quantity", "10")]),
            row(1, "A1", &[("quantity", "10")]),
        ]);

        assert_eq!(out[0].category, RowCategory::Matched);
        assert_eq!(out[1].category, RowCategory::Duplicate);
        assert!(out[1].reason.contains("row 0"));
    }

    #[test]
    fn blank_part_number_is_a_malformed_key() {
        let reconciler = reconciler(reference(&[("A1", &[("quantity", "10")])]));
        let out = reconciler.classify_all(&[row(0, "", &[("quantity", "10")])]);

        assert_eq!(out[0].category, RowCategory::MalformedKey);
    }

    #[test]
    fn key_pattern_rejects_odd_identifiers() {
        let reconciler = reconciler(reference(&[("A1", &[])]));
        let out = reconciler.classify_all(&[row(0, "A 1", &[]), row(1, "@B2", &[])]);

        assert_eq!(out[0].category, RowCategory::MalformedKey);
        assert_eq!(out[1].category, RowCategory::MalformedKey);
    }

    #[test]
    fn mismatch_takes_precedence_over_duplicate() {
        // A later occurrence with a bad field stays FieldMismatch, and a
        // still-later clean occurrence duplicates the first row.
        let reconciler = reconciler(reference(&[("A1", &[("quantity", "10")])]));
        let out = reconciler.classify_all(&[
            row(0, "A1", &[("quantity", "10")]),
            row(1, "A1", &[("quantity", "5")]),
            row(2, "A1", &[("quantity", "10")]),
        ]);

        assert_eq!(out[0].category, RowCategory::Matched);
        assert_eq!(out[1].category, RowCategory::FieldMismatch);
        assert_eq!(out[2].category, RowCategory::Duplicate);
        assert!(out[2].reason.contains("row 0"));
    }

    #[test]
    fn duplicate_references_a_mismatched_first_occurrence() {
        let reconciler = reconciler(reference(&[("A1", &[("quantity", "10")])]));
        let out = reconciler.classify_all(&[
            row(0, "A1", &[("quantity", "5")]),
            row(1, "A1", &[("quantity", "10")]),
        ]);

        assert_eq!(out[0].category, RowCategory::FieldMismatch);
        assert_eq!(out[1].category, RowCategory::Duplicate);
        assert!(out[1].reason.contains("row 0"));
    }

    #[test]
    fn numeric_tolerance_applies_to_numeric_fields() {
        let mut config = ReconcilerConfig::default();
        config.numeric_tolerance = 0.05;
        let reconciler =
            RowReconciler::new(reference(&[("A1", &[("quantity", "10.00")])]), config);

        let out = reconciler.classify_all(&[
            row(0, "A1", &[("quantity", "10.02")]),
            row(1, "A1", &[("quantity", "10.2")]),
        ]);

        assert_eq!(out[0].category, RowCategory::Matched);
        assert_eq!(out[1].category, RowCategory::FieldMismatch);
    }

    #[test]
    fn text_comparison_ignores_case_and_spacing() {
        let reconciler =
            reconciler(reference(&[("A1", &[("description", "Wire  Harness Clip")])]));
        let out =
            reconciler.classify_all(&[row(0, "a1", &[("description", "wire harness  CLIP")])]);

        assert_eq!(out[0].category, RowCategory::Matched);
    }

    #[test]
    fn missing_tracked_cell_reports_as_blank() {
        let reconciler = reconciler(reference(&[("A1", &[("quantity", "10")])]));
        let out = reconciler.classify_all(&[row(0, "A1", &[])]);

        assert_eq!(out[0].category, RowCategory::FieldMismatch);
        assert!(out[0].reason.contains("(blank)"));
    }

    #[test]
    fn classification_order_matches_input_order() {
        let reconciler = reconciler(reference(&[("A1", &[("quantity", "10")])]));
        let rows = vec![
            row(0, "A1", &[("quantity", "10")]),
            row(1, "", &[]),
            row(3, "Z9", &[("quantity", "1")]),
        ];
        let out = reconciler.classify_all(&rows);

        let indexes: Vec<usize> = out.iter().map(|c| c.row_index).collect();
        assert_eq!(indexes, vec![0, 1, 3]);
    }
}
