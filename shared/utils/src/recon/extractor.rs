//! Sheet Extractor
//!
//! Turns an uploaded workbook into an ordered sequence of row records
//! with column names normalized, and analyzes workbook sheets for the
//! sheet-selection flow.

use calamine::{open_workbook_auto, DataType, Range, Reader};
use std::collections::HashMap;
use std::path::Path;

use bomline_models::{SheetAnalysis, SheetInfo, UploadedRow, SHEET_COLUMN_PREVIEW};

use crate::error::{BomlineError, BomlineResult};

/// Canonical name of the part-identifier column.
pub const PART_NUMBER_FIELD: &str = "part_number";

/// Data rows captured as sample per sheet during analysis.
const SAMPLE_ROWS: usize = 3;

/// Maps raw spreadsheet headers to canonical attribute names.
///
/// Headers are trimmed, lowercased and whitespace-collapsed before the
/// synonym lookup, so ` Part  No. ` and `PART NO.` resolve the same.
/// Headers with no synonym keep their folded form with spaces as
/// underscores.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    synonyms: HashMap<String, String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        let mut synonyms = HashMap::new();
        for (synonym, canonical) in [
            ("pn", PART_NUMBER_FIELD),
            ("p/n", PART_NUMBER_FIELD),
            ("part no", PART_NUMBER_FIELD),
            ("part no.", PART_NUMBER_FIELD),
            ("part number", PART_NUMBER_FIELD),
            ("partnumber", PART_NUMBER_FIELD),
            ("item number", PART_NUMBER_FIELD),
            ("item no", PART_NUMBER_FIELD),
            ("sku", PART_NUMBER_FIELD),
            ("desc", "description"),
            ("item description", "description"),
            ("part description", "description"),
            ("qty", "quantity"),
            ("qty.", "quantity"),
            ("usage qty", "quantity"),
            ("cat", "category"),
            ("commodity", "category"),
            ("component category", "category"),
        ] {
            synonyms.insert(synonym.to_string(), canonical.to_string());
        }
        Self { synonyms }
    }
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table extended with `extra` mappings; `extra` wins on
    /// conflict. Keys match after folding, values must be canonical
    /// attribute names.
    pub fn with_synonyms(extra: &HashMap<String, String>) -> Self {
        let mut map = Self::default();
        for (synonym, canonical) in extra {
            map.synonyms.insert(fold(synonym), canonical.clone());
        }
        map
    }

    /// Canonical attribute name for a raw header.
    pub fn normalize(&self, raw: &str) -> String {
        let folded = fold(raw);
        match self.synonyms.get(&folded) {
            Some(canonical) => canonical.clone(),
            None => folded.replace(' ', "_"),
        }
    }
}

fn fold(raw: &str) -> String {
    let lower = raw.to_lowercase();
    lower.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reads uploaded workbooks into ordered row records.
#[derive(Debug, Clone, Default)]
pub struct SheetExtractor {
    columns: ColumnMap,
}

impl SheetExtractor {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    /// Analyze every sheet of a workbook. A sheet that fails to read is
    /// reported in place; only an unreadable workbook is an error.
    pub fn analyze(&self, path: &Path) -> BomlineResult<SheetAnalysis> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| BomlineError::sheet_read(format!("failed to open workbook: {e}")))?;
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in &sheet_names {
            let info = match workbook.worksheet_range(name) {
                Some(Ok(range)) => self.analyze_range(name, &range),
                Some(Err(e)) => SheetInfo::unreadable(name, e.to_string()),
                None => SheetInfo::unreadable(name, "sheet not found"),
            };
            sheets.push(info);
        }

        let recommended_sheet = recommend(&sheets);
        Ok(SheetAnalysis {
            total_sheets: sheets.len(),
            sheets,
            recommended_sheet,
        })
    }

    /// Ordered rows of one sheet, blank rows filtered.
    pub fn extract_rows(&self, path: &Path, sheet_name: &str) -> BomlineResult<Vec<UploadedRow>> {
        let range = self.read_range(path, sheet_name)?;
        self.rows_from_range(&range)
    }

    /// First `limit` data rows of a sheet as raw column/value maps.
    /// Unlike `rows_from_range` this does not require a part-number
    /// column, so any sheet can be previewed.
    pub fn preview(
        &self,
        path: &Path,
        sheet_name: &str,
        limit: usize,
    ) -> BomlineResult<Vec<HashMap<String, String>>> {
        let range = self.read_range(path, sheet_name)?;
        Ok(self.sample_from_range(&range, limit))
    }

    fn read_range(&self, path: &Path, sheet_name: &str) -> BomlineResult<Range<DataType>> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| BomlineError::sheet_read(format!("failed to open workbook: {e}")))?;
        workbook
            .worksheet_range(sheet_name)
            .ok_or_else(|| {
                BomlineError::sheet_read(format!("sheet '{sheet_name}' not found in workbook"))
            })?
            .map_err(|e| BomlineError::sheet_read(format!("failed to read sheet '{sheet_name}': {e}")))
    }

    /// Core extraction over an in-memory cell range. The first row is the
    /// header; data rows keep their 0-based ordinal even when blank rows
    /// are filtered out, so flagged-row indexes line up with the sheet.
    pub fn rows_from_range(&self, range: &Range<DataType>) -> BomlineResult<Vec<UploadedRow>> {
        let mut rows_iter = range.rows();
        let headers: Vec<String> = rows_iter
            .next()
            .ok_or_else(|| BomlineError::sheet_read("sheet is empty"))?
            .iter()
            .map(|cell| self.columns.normalize(&cell.to_string()))
            .collect();

        let key_idx = headers
            .iter()
            .position(|h| h == PART_NUMBER_FIELD)
            .ok_or_else(|| {
                BomlineError::sheet_read("no part-number column found after header normalization")
            })?;

        let mut rows = Vec::new();
        for (ordinal, cells) in rows_iter.enumerate() {
            if is_blank_row(cells) {
                continue;
            }

            let mut row = UploadedRow::new(ordinal, None);
            for (i, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let text = cell_text(cells, i);
                if i == key_idx && !text.is_empty() {
                    row.part_number = Some(text.clone());
                }
                row.values.insert(header.clone(), text);
            }
            rows.push(row);
        }

        tracing::debug!(rows = rows.len(), "extracted rows from sheet");
        Ok(rows)
    }

    fn analyze_range(&self, name: &str, range: &Range<DataType>) -> SheetInfo {
        let raw_headers: Vec<String> = range
            .rows()
            .next()
            .map(|cells| cells.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();

        let data_rows = range.height().saturating_sub(1);
        let columns = if raw_headers.is_empty() { 0 } else { range.width() };

        let part_number_columns: Vec<String> = raw_headers
            .iter()
            .filter(|h| self.columns.normalize(h) == PART_NUMBER_FIELD)
            .cloned()
            .collect();

        let total_cells = data_rows * columns;
        let filled: usize = range
            .rows()
            .skip(1)
            .map(|cells| cells.iter().filter(|c| !c.to_string().trim().is_empty()).count())
            .sum();
        let data_density = if total_cells == 0 {
            0.0
        } else {
            (filled as f64 / total_cells as f64 * 1000.0).round() / 10.0
        };

        let is_data_sheet = data_rows >= 1 && columns > 1 && data_density > 10.0;
        let recommended = !part_number_columns.is_empty() && is_data_sheet;

        SheetInfo {
            name: name.to_string(),
            rows: data_rows,
            columns,
            column_names: raw_headers.iter().take(SHEET_COLUMN_PREVIEW).cloned().collect(),
            part_number_columns,
            data_density,
            is_data_sheet,
            sample_rows: self.sample_from_range(range, SAMPLE_ROWS),
            recommended,
            error: None,
        }
    }

    fn sample_from_range(
        &self,
        range: &Range<DataType>,
        limit: usize,
    ) -> Vec<HashMap<String, String>> {
        let mut rows_iter = range.rows();
        let headers: Vec<String> = match rows_iter.next() {
            Some(cells) => cells
                .iter()
                .map(|cell| self.columns.normalize(&cell.to_string()))
                .collect(),
            None => return Vec::new(),
        };

        rows_iter
            .filter(|cells| !is_blank_row(cells))
            .take(limit)
            .map(|cells| {
                headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| !h.is_empty())
                    .map(|(i, h)| (h.clone(), cell_text(cells, i)))
                    .collect()
            })
            .collect()
    }
}

/// Best sheet to reconcile: recommended sheets first, then data sheets,
/// then any readable sheet, ranked by quality score.
fn recommend(sheets: &[SheetInfo]) -> Option<String> {
    let readable = || sheets.iter().filter(|s| s.error.is_none());
    best_by_score(readable().filter(|s| s.recommended))
        .or_else(|| best_by_score(readable().filter(|s| s.is_data_sheet)))
        .or_else(|| best_by_score(readable()))
        .map(|s| s.name.clone())
}

fn best_by_score<'a>(sheets: impl Iterator<Item = &'a SheetInfo>) -> Option<&'a SheetInfo> {
    sheets.max_by(|a, b| a.quality_score().total_cmp(&b.quality_score()))
}

fn cell_text(cells: &[DataType], idx: usize) -> String {
    cells
        .get(idx)
        .map(|c| c.to_string().trim().to_string())
        .unwrap_or_default()
}

fn is_blank_row(cells: &[DataType]) -> bool {
    cells.iter().all(|c| c.to_string().trim().is_empty())
}
