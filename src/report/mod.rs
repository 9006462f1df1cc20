use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::core::{CheckError, ReportEntry};

pub const DEFAULT_REPORT_FILE: &str = "security_report.txt";

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const SEPARATOR_WIDTH: usize = 30;

pub fn format_timestamp(entry: &ReportEntry) -> String {
    entry
        .generated_at
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Renders one report block, terminated by the separator line.
pub fn render_entry(entry: &ReportEntry) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Security Report: {} ===", format_timestamp(entry));
    let _ = writeln!(out, "Scanned directory: {}", entry.directory.display());
    if entry.findings.is_empty() {
        let _ = writeln!(out, "No world-writable files found.");
    } else {
        let _ = writeln!(out, "World-writable files ({}):", entry.findings.len());
        for finding in &entry.findings {
            let _ = writeln!(out, "  - {}", finding.path.display());
        }
    }
    let _ = writeln!(out, "Scanned log file: {}", entry.log_path.display());
    for (keyword, count) in entry.counts.iter() {
        let _ = writeln!(out, "{keyword} entries: {count}");
    }
    let _ = writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH));

    out
}

/// Appends `entry` to the report at `report_path`, creating the file if
/// needed. Existing content is never rewritten.
pub fn append_entry(report_path: &Path, entry: &ReportEntry) -> Result<(), CheckError> {
    let block = render_entry(entry);
    let write_err = |source: std::io::Error| CheckError::ReportWrite {
        path: report_path.to_path_buf(),
        source,
    };

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(report_path)
        .map_err(write_err)?;
    file.write_all(block.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    Ok(())
}
