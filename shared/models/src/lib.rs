//! # Bomline Core Domain Models
//!
//! Core domain models for the bomline BOM reconciliation system. All
//! models serialize with serde; models with format constraints validate
//! with the validator crate.
//!
//! ## Key Models
//!
//! - **ReferenceEntry** / **ReferenceTable**: the master reference
//!   dataset, keyed by canonical part number
//! - **UploadedRow**: one data row from an uploaded sheet, columns
//!   normalized
//! - **RowClassification** / **RowCategory**: per-row reconciliation
//!   outcome
//! - **CleaningReport**: aggregated counts, quality score, and flagged
//!   rows for one run
//! - **SheetInfo** / **SheetAnalysis**: workbook sheet metadata for the
//!   sheet-selection flow

pub mod classification;
pub mod reference;
pub mod report;
pub mod row;
pub mod sheet;

pub use classification::{RowCategory, RowClassification};
pub use reference::{canonical_part_number, ReferenceEntry, ReferenceTable};
pub use report::CleaningReport;
pub use row::UploadedRow;
pub use sheet::{SheetAnalysis, SheetInfo, SHEET_COLUMN_PREVIEW};
