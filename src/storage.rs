use crate::dashboard::Report;
use crate::stats::{StatisticsRow, fmt2};
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix text cells that a spreadsheet would evaluate as a formula.
fn sanitize_cell(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{}", s)
    } else {
        s.to_string()
    }
}

/// Save statistics rows as CSV with header; values rounded to two decimals.
pub fn save_statistics_csv<P: AsRef<Path>>(rows: &[StatisticsRow], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record([
        "metric", "country", "count", "mean", "std", "min", "p25", "p50", "p75", "max",
    ])?;
    for r in rows {
        wtr.write_record([
            sanitize_cell(&r.metric),
            sanitize_cell(r.country.name()),
            r.count.to_string(),
            fmt2(r.mean),
            r.std.map(fmt2).unwrap_or_default(),
            fmt2(r.min),
            fmt2(r.p25),
            fmt2(r.p50),
            fmt2(r.p75),
            fmt2(r.max),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a full report as pretty JSON.
pub fn save_report_json<P: AsRef<Path>>(report: &Report, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(report)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
