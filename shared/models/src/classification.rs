//! Row classification model.

use serde::{Deserialize, Serialize};

/// Outcome category for a reconciled row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RowCategory {
    Matched,
    FieldMismatch,
    MissingFromReference,
    Duplicate,
    MalformedKey,
}

impl RowCategory {
    /// All categories, in report display order.
    pub const ALL: [RowCategory; 5] = [
        RowCategory::Matched,
        RowCategory::FieldMismatch,
        RowCategory::MissingFromReference,
        RowCategory::Duplicate,
        RowCategory::MalformedKey,
    ];

    /// Wire tag, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RowCategory::Matched => "matched",
            RowCategory::FieldMismatch => "field_mismatch",
            RowCategory::MissingFromReference => "missing_from_reference",
            RowCategory::Duplicate => "duplicate",
            RowCategory::MalformedKey => "malformed_key",
        }
    }
}

/// Classification of a single uploaded row.
///
/// Refers back to the row by ordinal; created by the reconciler and
/// consumed by the report builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowClassification {
    pub row_index: usize,
    pub category: RowCategory,
    pub reason: String,
}

impl RowClassification {
    pub fn new(row_index: usize, category: RowCategory, reason: impl Into<String>) -> Self {
        Self {
            row_index,
            category,
            reason: reason.into(),
        }
    }

    pub fn matched(row_index: usize) -> Self {
        Self::new(row_index, RowCategory::Matched, "matched reference entry")
    }

    pub fn is_matched(&self) -> bool {
        self.category == RowCategory::Matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_tags_are_snake_case() {
        for category in RowCategory::ALL {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, serde_json::Value::String(category.as_str().to_string()));
        }
    }
}
