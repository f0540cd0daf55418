//! Writing feature matrices out
//!
//! CSV with a header row of column names, JSON, and a short text summary.

use crate::features::{DateFeature, FeatureMatrix};
use crate::Result;
use std::fmt::Write as _;
use std::io::Write;

/// Write the matrix as CSV: header of column names, then one row per record
pub fn write_csv<W: Write>(matrix: &FeatureMatrix, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&matrix.names)?;

    for row in matrix.values.rows() {
        csv_writer.write_record(row.iter().map(|v| v.to_string()))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// JSON document `{"names": [...], "rows": [[...], ...]}`
pub fn to_json(matrix: &FeatureMatrix) -> serde_json::Value {
    let rows: Vec<Vec<f64>> = matrix.values.rows().into_iter().map(|r| r.to_vec()).collect();
    serde_json::json!({
        "names": matrix.names,
        "rows": rows,
    })
}

pub fn write_json<W: Write>(matrix: &FeatureMatrix, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &to_json(matrix))?;
    Ok(())
}

/// Human readable summary of the matrix and the anchor day of each record
pub fn format_summary(matrix: &FeatureMatrix, max_rows: usize) -> String {
    let (rows, cols) = matrix.shape();
    let anchor = matrix.time_range() / 2;
    let mut out = String::new();

    let _ = writeln!(out, "Feature Matrix");
    let _ = writeln!(out, "───────────────────────────────");
    let _ = writeln!(out, "  Records:  {}", rows);
    let _ = writeln!(out, "  Columns:  {}", cols);
    let _ = writeln!(out, "  Window:   {} days", matrix.time_range());

    if rows == 0 {
        return out;
    }

    let _ = writeln!(out, "\n  {:>4}  {:<10}  {:>7}  {:>7}  {:>7}", "#", "Date", "Weekday", "Holiday", "Named");
    for i in 0..rows.min(max_rows) {
        let get = |f| matrix.value(i, anchor, f);
        let date = format!(
            "{:04}-{:02}-{:02}",
            get(DateFeature::Year),
            get(DateFeature::Month),
            get(DateFeature::DayOfMonth)
        );
        let named = if get(DateFeature::Christmas) > 0.0 {
            "Xmas"
        } else if get(DateFeature::Easter) > 0.0 {
            "Easter"
        } else {
            "-"
        };
        let _ = writeln!(
            out,
            "  {:>4}  {:<10}  {:>7}  {:>7}  {:>7}",
            i,
            date,
            get(DateFeature::Weekday),
            get(DateFeature::Holiday),
            named
        );
    }
    if rows > max_rows {
        let _ = writeln!(out, "  ... {} more", rows - max_rows);
    }

    out
}
