//! End-to-end reconciliation pipeline: load a reference source, extract
//! rows from a sheet, classify, aggregate, and check the wire shape of
//! the resulting report.

use std::io::Write;
use std::sync::Arc;

use calamine::{DataType, Range};

use bomline_utils::{
    build_report, ColumnMap, ReconcilerConfig, ReferenceLoader, RowReconciler, SheetExtractor,
};

fn sheet(cells: &[&[&str]]) -> Range<DataType> {
    let rows = cells.len() as u32;
    let cols = cells.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
    let mut range = Range::new((0, 0), (rows - 1, cols - 1));
    for (r, row) in cells.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            range.set_value((r as u32, c as u32), DataType::String(value.to_string()));
        }
    }
    range
}

#[test]
fn reconcile_pipeline_produces_the_wire_report() {
    let mut reference_csv = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(
        reference_csv,
        "Part Number,Qty,Description\nAB-100,10,Clip\nAB-200,2,Bracket\n"
    )
    .unwrap();
    let table = ReferenceLoader::default().load(reference_csv.path()).unwrap();

    let extractor = SheetExtractor::new(ColumnMap::default());
    let rows = extractor
        .rows_from_range(&sheet(&[
            &["Part No", "Qty", "Desc"],
            &["AB-100", "10", "Clip"],   // matched
            &["AB-100", "10", "Clip"],   // duplicate of row 0
            &["AB-200", "3", "Bracket"], // quantity mismatch
            &["ZZ-999", "1", "Unknown"], // missing from reference
            &["", "", ""],               // blank, filtered
            &["??", "1", "Bad"],         // malformed key
        ]))
        .unwrap();
    assert_eq!(rows.len(), 5);

    let reconciler = RowReconciler::new(Arc::new(table), ReconcilerConfig::default());
    let report = build_report(&reconciler.classify_all(&rows));

    assert_eq!(report.total_rows, 5);
    assert_eq!(report.quality_score, 0.2);
    assert!(!report.is_clean());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["counts"]["matched"], 1);
    assert_eq!(json["counts"]["duplicate"], 1);
    assert_eq!(json["counts"]["field_mismatch"], 1);
    assert_eq!(json["counts"]["missing_from_reference"], 1);
    assert_eq!(json["counts"]["malformed_key"], 1);

    let flagged = json["flagged_rows"].as_array().unwrap();
    assert_eq!(flagged.len(), 4);
    assert_eq!(flagged[0]["row_index"], 1);
    assert_eq!(flagged[0]["category"], "duplicate");
    assert!(flagged[0]["reason"].as_str().unwrap().contains("row 0"));
    assert_eq!(flagged[1]["category"], "field_mismatch");
    assert!(flagged[1]["reason"].as_str().unwrap().contains("quantity"));
    // The blank sheet row was filtered but its ordinal survives.
    assert_eq!(flagged[3]["row_index"], 5);
    assert_eq!(flagged[3]["category"], "malformed_key");
}

#[test]
fn rerunning_the_pass_yields_an_identical_report() {
    let mut reference_csv = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(reference_csv, "PN,Qty\nA1,10\n").unwrap();
    let table = Arc::new(ReferenceLoader::default().load(reference_csv.path()).unwrap());

    let extractor = SheetExtractor::default();
    let rows = extractor
        .rows_from_range(&sheet(&[
            &["PN", "Qty"],
            &["A1", "10"],
            &["A1", "5"],
            &["B2", "1"],
        ]))
        .unwrap();

    let first = build_report(
        &RowReconciler::new(table.clone(), ReconcilerConfig::default()).classify_all(&rows),
    );
    let second = build_report(
        &RowReconciler::new(table, ReconcilerConfig::default()).classify_all(&rows),
    );

    assert_eq!(first, second);
}
