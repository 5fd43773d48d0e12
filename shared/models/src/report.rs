//! Cleaning report aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classification::{RowCategory, RowClassification};

/// Summary of one reconciliation run.
///
/// Invariants, maintained by the report builder: per-category counts sum
/// to `total_rows`, `quality_score` is in `[0, 1]`, and `flagged_rows`
/// is the ordered subsequence of non-matched classifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleaningReport {
    pub total_rows: usize,
    /// Count per category. Every category is present, zero or not, so
    /// the wire shape is stable for callers.
    pub counts: BTreeMap<RowCategory, usize>,
    /// Fraction of rows classified `Matched`; 0.0 for an empty run.
    pub quality_score: f64,
    pub flagged_rows: Vec<RowClassification>,
}

impl CleaningReport {
    /// Report for a run with no rows.
    pub fn empty() -> Self {
        Self {
            total_rows: 0,
            counts: RowCategory::ALL.iter().map(|c| (*c, 0)).collect(),
            quality_score: 0.0,
            flagged_rows: Vec::new(),
        }
    }

    pub fn count(&self, category: RowCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn matched_count(&self) -> usize {
        self.count(RowCategory::Matched)
    }

    /// True when every row matched the reference.
    pub fn is_clean(&self) -> bool {
        self.flagged_rows.is_empty()
    }
}
