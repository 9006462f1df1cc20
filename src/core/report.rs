use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::{FileFinding, KeywordCounts};

/// One appended section of the report file. Built once per run and never
/// edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub generated_at: OffsetDateTime,
    pub directory: PathBuf,
    pub findings: Vec<FileFinding>,
    pub log_path: PathBuf,
    pub counts: KeywordCounts,
}

impl ReportEntry {
    pub fn new(
        directory: impl Into<PathBuf>,
        findings: Vec<FileFinding>,
        log_path: impl Into<PathBuf>,
        counts: KeywordCounts,
    ) -> Self {
        Self {
            generated_at: local_now(),
            directory: directory.into(),
            findings,
            log_path: log_path.into(),
            counts,
        }
    }
}

pub(crate) fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Scanned,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub schema_version: String,
    pub tool_version: String,
    pub generated_at: String,
    pub directory: String,
    pub world_writable: Vec<String>,
    pub files_checked: u64,
    pub skipped_entries: u64,
    pub log_file: String,
    pub log_status: LogStatus,
    pub log_lines: u64,
    pub counts: KeywordCounts,
    pub report_path: String,
}
