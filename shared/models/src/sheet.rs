//! Workbook sheet metadata.
//!
//! Uploaded workbooks often carry several sheets (cover pages, pivot
//! summaries, the actual BOM). Sheet analysis scores each one so the
//! caller can recommend which sheet to reconcile.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How many leading column names to keep in a `SheetInfo`.
pub const SHEET_COLUMN_PREVIEW: usize = 10;

/// Metadata for one sheet of an uploaded workbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetInfo {
    pub name: String,
    /// Data rows (header excluded).
    pub rows: usize,
    pub columns: usize,
    /// Leading column names, capped at `SHEET_COLUMN_PREVIEW`.
    pub column_names: Vec<String>,
    /// Columns whose normalized name resolves to the part-number field.
    pub part_number_columns: Vec<String>,
    /// Share of non-empty cells, as a percentage.
    pub data_density: f64,
    pub is_data_sheet: bool,
    /// First few data rows, for preview in the selection UI.
    pub sample_rows: Vec<HashMap<String, String>>,
    pub recommended: bool,
    /// Set when the sheet could not be read; such sheets are reported,
    /// not fatal to the analysis.
    pub error: Option<String>,
}

impl SheetInfo {
    pub fn unreadable(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: 0,
            columns: 0,
            column_names: Vec::new(),
            part_number_columns: Vec::new(),
            data_density: 0.0,
            is_data_sheet: false,
            sample_rows: Vec::new(),
            recommended: false,
            error: Some(error.into()),
        }
    }

    pub fn has_part_number_columns(&self) -> bool {
        !self.part_number_columns.is_empty()
    }

    /// Heuristic sheet quality on a 0-100 scale: data-sheet shape and a
    /// detectable part-number column dominate, density breaks ties.
    pub fn quality_score(&self) -> f64 {
        let mut score = 0.0;
        if self.is_data_sheet {
            score += 30.0;
        }
        if self.has_part_number_columns() {
            score += 40.0;
        }
        score += self.data_density * 0.3;
        score.min(100.0)
    }
}

/// Result of analyzing every sheet in a workbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetAnalysis {
    pub total_sheets: usize,
    pub sheets: Vec<SheetInfo>,
    /// Best sheet to reconcile, when any sheet is readable.
    pub recommended_sheet: Option<String>,
}

impl SheetAnalysis {
    pub fn data_sheets(&self) -> impl Iterator<Item = &SheetInfo> {
        self.sheets.iter().filter(|s| s.is_data_sheet && s.error.is_none())
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetInfo> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_is_bounded() {
        let mut info = SheetInfo::unreadable("Sheet1", "boom");
        assert_eq!(info.quality_score(), 0.0);

        info.error = None;
        info.is_data_sheet = true;
        info.part_number_columns = vec!["part_number".to_string()];
        info.data_density = 100.0;
        assert_eq!(info.quality_score(), 100.0);
    }
}
