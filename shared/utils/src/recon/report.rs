//! Cleaning Report Builder
//!
//! Pure aggregation of an ordered classification sequence into the
//! report returned to the caller. No I/O, no failure modes beyond the
//! empty-run guard on the quality score.

use std::collections::BTreeMap;

use bomline_models::{CleaningReport, RowCategory, RowClassification};

/// Aggregate ordered classifications into a `CleaningReport`.
///
/// Counts sum to the input length, `quality_score` is matched/total
/// (0.0 for an empty run), and `flagged_rows` is the ordered non-matched
/// subsequence.
pub fn build_report(classifications: &[RowClassification]) -> CleaningReport {
    let total_rows = classifications.len();

    let mut counts: BTreeMap<RowCategory, usize> =
        RowCategory::ALL.iter().map(|category| (*category, 0)).collect();
    for classification in classifications {
        if let Some(count) = counts.get_mut(&classification.category) {
            *count += 1;
        }
    }

    let matched = counts.get(&RowCategory::Matched).copied().unwrap_or(0);
    let quality_score = if total_rows == 0 {
        0.0
    } else {
        matched as f64 / total_rows as f64
    };

    let flagged_rows = classifications
        .iter()
        .filter(|classification| !classification.is_matched())
        .cloned()
        .collect();

    CleaningReport {
        total_rows,
        counts,
        quality_score,
        flagged_rows,
    }
}
