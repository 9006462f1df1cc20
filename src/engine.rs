use std::path::PathBuf;
use std::time::{Duration, Instant};

use time::format_description::well_known::Rfc3339;

use crate::core::{CheckError, CheckSummary, ReportEntry};
use crate::keywords::LogScan;
use crate::scan::{CancelFlag, DirScan, WalkOptions};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Upper bound for the directory walk. `None` means no deadline.
    pub timeout: Option<Duration>,
    pub show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub directory: PathBuf,
    pub log_path: PathBuf,
    pub report_path: PathBuf,
    pub exclude: Vec<String>,
    pub cancel: Option<CancelFlag>,
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub entry: ReportEntry,
    pub dir_scan: DirScan,
    pub log_scan: LogScan,
    pub report_path: PathBuf,
}

#[derive(Clone)]
pub struct Engine {
    opts: EngineOptions,
}

impl Engine {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    /// Directory walk, then log scan, then one appended report entry.
    ///
    /// A failed walk stops the run before anything is written. A missing log
    /// file is carried through with zero counts.
    pub fn check(&self, req: CheckRequest) -> Result<CheckOutcome, CheckError> {
        let walk = WalkOptions {
            exclude: req.exclude.clone(),
            deadline: self.opts.timeout.map(|t| Instant::now() + t),
            cancel: req.cancel.clone(),
        };

        let pb = self.spinner(format!("走査中 {}", req.directory.display()));
        let dir_scan = crate::scan::world_writable(&req.directory, &walk);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        let dir_scan = dir_scan?;

        let log_scan = crate::keywords::scan_log(&req.log_path)?;

        let entry = ReportEntry::new(
            req.directory.clone(),
            dir_scan.findings.clone(),
            req.log_path.clone(),
            log_scan.counts,
        );
        crate::report::append_entry(&req.report_path, &entry)?;

        Ok(CheckOutcome {
            entry,
            dir_scan,
            log_scan,
            report_path: req.report_path,
        })
    }

    fn spinner(&self, message: String) -> Option<indicatif::ProgressBar> {
        use std::io::IsTerminal;
        if !(self.opts.show_progress && std::io::stderr().is_terminal()) {
            return None;
        }
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}

impl CheckOutcome {
    pub fn summary(&self) -> CheckSummary {
        CheckSummary {
            schema_version: "1.0".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: self
                .entry
                .generated_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| "unknown".to_string()),
            directory: self.entry.directory.display().to_string(),
            world_writable: self
                .entry
                .findings
                .iter()
                .map(|f| f.path.display().to_string())
                .collect(),
            files_checked: self.dir_scan.files_checked,
            skipped_entries: self.dir_scan.skipped(),
            log_file: self.entry.log_path.display().to_string(),
            log_status: self.log_scan.status,
            log_lines: self.log_scan.lines,
            counts: self.entry.counts,
            report_path: self.report_path.display().to_string(),
        }
    }
}
