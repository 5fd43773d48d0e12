//! BOM Reconciliation Core
//!
//! Single-pass reconciliation of uploaded BOM sheets against the master
//! reference table: load the reference into a lookup, extract normalized
//! rows from a selected sheet, classify each row, aggregate the cleaning
//! report.

pub mod extractor;
pub mod loader;
pub mod reconciler;
pub mod report;

pub use extractor::{ColumnMap, SheetExtractor, PART_NUMBER_FIELD};
pub use loader::{ReferenceFormat, ReferenceLoader, SharedReferenceTable};
pub use reconciler::{ReconcilerConfig, RowReconciler, DEFAULT_KEY_PATTERN};
pub use report::build_report;
