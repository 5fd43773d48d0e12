//! Reference Table Loader
//!
//! Loads the master reference dataset (Excel or CSV) into an in-memory
//! lookup keyed by canonical part number, and provides the shared
//! read-after-load handle the service hands to concurrent requests.

use calamine::{open_workbook_auto, Reader};
use std::path::Path;
use std::sync::{Arc, RwLock};

use bomline_models::{ReferenceEntry, ReferenceTable};

use crate::error::{BomlineError, BomlineResult};
use crate::recon::extractor::{ColumnMap, PART_NUMBER_FIELD};
use crate::validation::validate_model;

/// Supported reference source formats, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFormat {
    Csv,
    Excel, // XLSX/XLS
}

impl ReferenceFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Loads the master reference dataset into a `ReferenceTable`.
///
/// Duplicate part numbers keep the last occurrence, one warning per
/// overwrite. Rows with a blank part number are skipped. Headers go
/// through the same normalization as uploaded sheets, so the reference
/// and the uploads agree on canonical attribute names.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLoader {
    columns: ColumnMap,
}

impl ReferenceLoader {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    pub fn load(&self, path: &Path) -> BomlineResult<ReferenceTable> {
        let format = ReferenceFormat::from_extension(path).ok_or_else(|| {
            BomlineError::reference_load(format!(
                "unsupported reference source '{}', expected .xlsx/.xls/.csv",
                path.display()
            ))
        })?;

        let table = match format {
            ReferenceFormat::Csv => self.load_csv(path)?,
            ReferenceFormat::Excel => self.load_excel(path)?,
        };

        tracing::info!(
            entries = table.len(),
            source = %path.display(),
            "reference table loaded"
        );
        Ok(table)
    }

    fn load_csv(&self, path: &Path) -> BomlineResult<ReferenceTable> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                BomlineError::reference_load(format!("failed to open reference source: {e}"))
            })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| {
                BomlineError::reference_load(format!("failed to read reference headers: {e}"))
            })?
            .iter()
            .map(|h| self.columns.normalize(h))
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            match record {
                Ok(record) => {
                    rows.push(record.iter().map(|v| v.trim().to_string()).collect());
                }
                Err(e) => {
                    tracing::warn!(row = idx + 2, error = %e, "unreadable reference row skipped");
                }
            }
        }

        self.build_table(headers, rows)
    }

    fn load_excel(&self, path: &Path) -> BomlineResult<ReferenceTable> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            BomlineError::reference_load(format!("failed to open reference workbook: {e}"))
        })?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| BomlineError::reference_load("reference workbook has no sheets"))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .ok_or_else(|| {
                BomlineError::reference_load(format!("reference sheet '{sheet_name}' not found"))
            })?
            .map_err(|e| {
                BomlineError::reference_load(format!("failed to read reference sheet: {e}"))
            })?;

        let mut rows_iter = range.rows();
        let headers: Vec<String> = rows_iter
            .next()
            .ok_or_else(|| BomlineError::reference_load("reference sheet is empty"))?
            .iter()
            .map(|cell| self.columns.normalize(&cell.to_string()))
            .collect();

        let rows: Vec<Vec<String>> = rows_iter
            .map(|cells| cells.iter().map(|c| c.to_string().trim().to_string()).collect())
            .collect();

        self.build_table(headers, rows)
    }

    fn build_table(
        &self,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> BomlineResult<ReferenceTable> {
        let key_idx = headers
            .iter()
            .position(|h| h == PART_NUMBER_FIELD)
            .ok_or_else(|| {
                BomlineError::reference_load("reference source has no part-number column")
            })?;

        let attribute_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != key_idx && !h.is_empty())
            .map(|(_, h)| h.clone())
            .collect();

        let mut table = ReferenceTable::new(attribute_names);
        for (idx, cells) in rows.iter().enumerate() {
            let part_number = cells.get(key_idx).map(String::as_str).unwrap_or("").trim();
            if part_number.is_empty() {
                tracing::warn!(row = idx + 2, "reference row with blank part number skipped");
                continue;
            }

            let mut entry = ReferenceEntry::new(part_number);
            for (i, header) in headers.iter().enumerate() {
                if i == key_idx || header.is_empty() {
                    continue;
                }
                let value = cells.get(i).map(String::as_str).unwrap_or("");
                entry.attributes.insert(header.clone(), value.to_string());
            }

            if let Err(e) = validate_model(&entry) {
                tracing::warn!(row = idx + 2, error = %e, "invalid reference entry skipped");
                continue;
            }

            if let Some(previous) = table.insert(entry) {
                tracing::warn!(
                    part_number = %previous.part_number,
                    row = idx + 2,
                    "duplicate part number in reference source, keeping last occurrence"
                );
            }
        }

        if table.is_empty() {
            return Err(BomlineError::reference_load(
                "reference source contains no usable rows",
            ));
        }

        Ok(table)
    }
}

/// Process-wide handle to the loaded reference table.
///
/// Readers take an `Arc` snapshot, so a reload never mutates a mapping
/// an in-flight run is reading; `swap` replaces the whole table at once.
#[derive(Clone, Default)]
pub struct SharedReferenceTable {
    inner: Arc<RwLock<Option<Arc<ReferenceTable>>>>,
}

impl SharedReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preloaded(table: ReferenceTable) -> Self {
        let handle = Self::default();
        handle.swap(table);
        handle
    }

    /// Snapshot of the current table, if one has been loaded.
    pub fn current(&self) -> Option<Arc<ReferenceTable>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Atomically replace the table; returns the entry count now live.
    pub fn swap(&self, table: ReferenceTable) -> usize {
        let entries = table.len();
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(table));
        entries
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_reference_with_synonym_headers() {
        let file = write_csv("Part No,Qty,Category\nAB-100,10,Fastener\nAB-101,4,Clip\n");
        let table = ReferenceLoader::default().load(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.attribute_names(), ["quantity", "category"]);
        assert_eq!(table.get("ab-100").unwrap().attribute("quantity"), Some("10"));
    }

    #[test]
    fn duplicate_part_numbers_keep_last_occurrence() {
        let file = write_csv("PN,Qty\nAB-100,10\nAB-100,12\n");
        let table = ReferenceLoader::default().load(file.path()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("AB-100").unwrap().attribute("quantity"), Some("12"));
    }

    #[test]
    fn missing_part_number_column_fails_the_load() {
        let file = write_csv("Desc,Qty\nClip,10\n");
        let err = ReferenceLoader::default().load(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "REFERENCE_LOAD_ERROR");
    }

    #[test]
    fn unsupported_extension_fails_the_load() {
        let err = ReferenceLoader::default()
            .load(Path::new("master.txt"))
            .unwrap_err();
        assert_eq!(err.error_code(), "REFERENCE_LOAD_ERROR");
    }

    #[test]
    fn shared_handle_swaps_whole_snapshots() {
        let handle = SharedReferenceTable::new();
        assert!(!handle.is_loaded());

        let mut table = ReferenceTable::new(vec![]);
        table.insert(ReferenceEntry::new("AB-100"));
        assert_eq!(handle.swap(table), 1);

        let before = handle.current().unwrap();

        let mut replacement = ReferenceTable::new(vec![]);
        replacement.insert(ReferenceEntry::new("AB-100"));
        replacement.insert(ReferenceEntry::new("AB-101"));
        handle.swap(replacement);

        // An in-flight reader's snapshot is untouched by the swap.
        assert_eq!(before.len(), 1);
        assert_eq!(handle.current().unwrap().len(), 2);
    }
}
