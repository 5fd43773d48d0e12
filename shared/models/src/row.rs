//! Uploaded-row model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One data row as read from an uploaded sheet.
///
/// Produced by the sheet extractor with column names already normalized
/// to canonical attribute names; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedRow {
    /// 0-based ordinal among the sheet's data rows (header excluded).
    /// Blank rows are filtered out by the extractor but still consume an
    /// ordinal, so this index lines up with the sheet a user is looking at.
    pub row_index: usize,
    /// Part number as read from the sheet, trimmed. `None` when the cell
    /// is blank or the column value is empty.
    pub part_number: Option<String>,
    /// Raw cell text keyed by canonical column name.
    pub values: HashMap<String, String>,
}

impl UploadedRow {
    pub fn new(row_index: usize, part_number: Option<String>) -> Self {
        Self {
            row_index,
            part_number,
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Raw cell text for a canonical field name.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }
}
