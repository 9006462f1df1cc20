use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::{CheckError, KeywordCounts, LogStatus};
use crate::engine::{CheckOutcome, CheckRequest};

#[derive(Debug, Serialize)]
struct CheckRunLog {
    schema_version: &'static str,
    tool_version: String,
    command: &'static str,
    started_at: String,
    finished_at: String,
    status: &'static str,
    directory: String,
    log_file: String,
    report_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<CheckRunResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<CheckRunError>,
}

#[derive(Debug, Serialize)]
struct CheckRunResult {
    world_writable: Vec<String>,
    files_checked: u64,
    skipped_metadata: u64,
    skipped_unreadable: u64,
    log_status: LogStatus,
    log_lines: u64,
    counts: KeywordCounts,
}

#[derive(Debug, Serialize)]
struct CheckRunError {
    kind: &'static str,
    message: String,
}

pub fn logs_dir(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/seccheck/logs")
}

/// Writes one JSON run log for a `check` invocation and returns its path.
pub fn write_check_log(
    home_dir: &Path,
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
    request: &CheckRequest,
    result: Result<&CheckOutcome, &CheckError>,
) -> Result<PathBuf> {
    let dir = logs_dir(home_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("ログディレクトリの作成に失敗しました: {}", dir.display()))?;

    let pid = std::process::id();
    let ts = finished_at.unix_timestamp_nanos();
    let path = dir.join(format!("check-{pid}-{ts}.json"));

    let (status, result, error) = match result {
        Ok(outcome) => {
            let status = if outcome.log_scan.is_not_found() {
                "log_not_found"
            } else {
                "ok"
            };
            let run = CheckRunResult {
                world_writable: outcome
                    .entry
                    .findings
                    .iter()
                    .map(|f| f.path.display().to_string())
                    .collect(),
                files_checked: outcome.dir_scan.files_checked,
                skipped_metadata: outcome.dir_scan.skipped_metadata,
                skipped_unreadable: outcome.dir_scan.skipped_unreadable,
                log_status: outcome.log_scan.status,
                log_lines: outcome.log_scan.lines,
                counts: outcome.log_scan.counts,
            };
            (status, Some(run), None)
        }
        Err(err) => (
            "error",
            None,
            Some(CheckRunError {
                kind: err.kind_name(),
                message: error_chain(err),
            }),
        ),
    };

    let log = CheckRunLog {
        schema_version: "1.0",
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: "check",
        started_at: started_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string()),
        finished_at: finished_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string()),
        status,
        directory: request.directory.display().to_string(),
        log_file: request.log_path.display().to_string(),
        report_path: request.report_path.display().to_string(),
        result,
        error,
    };

    let buf = serde_json::to_vec_pretty(&log).context("ログ(JSON)のシリアライズに失敗しました")?;
    std::fs::write(&path, buf)
        .with_context(|| format!("ログの書き込みに失敗しました: {}", path.display()))?;
    Ok(path)
}

fn error_chain(err: &CheckError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}
