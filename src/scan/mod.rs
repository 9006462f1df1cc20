use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use crate::core::{CheckError, FileFinding};
use crate::platform;

/// Shared flag a caller can raise to stop a running walk between entries.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub exclude: Vec<String>,
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Metadata,
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryOutcome {
    WorldWritable(PathBuf),
    Clean,
    NotAFile,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirScan {
    pub root: PathBuf,
    pub findings: Vec<FileFinding>,
    pub files_checked: u64,
    pub skipped_metadata: u64,
    pub skipped_unreadable: u64,
}

impl DirScan {
    pub fn skipped(&self) -> u64 {
        self.skipped_metadata.saturating_add(self.skipped_unreadable)
    }

    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::WorldWritable(path) => {
                self.files_checked = self.files_checked.saturating_add(1);
                self.findings.push(FileFinding::new(path));
            }
            EntryOutcome::Clean => {
                self.files_checked = self.files_checked.saturating_add(1);
            }
            EntryOutcome::NotAFile => {}
            EntryOutcome::Skipped(SkipReason::Metadata) => {
                self.skipped_metadata = self.skipped_metadata.saturating_add(1);
            }
            EntryOutcome::Skipped(SkipReason::Unreadable) => {
                self.skipped_unreadable = self.skipped_unreadable.saturating_add(1);
            }
        }
    }
}

/// Collects every regular file under `root` whose mode grants write to
/// others.
///
/// The root must be an existing, readable directory. Entries below it that
/// cannot be read or stat'ed are skipped and counted; they never fail the
/// walk. A symlink to a file is checked against its target's mode and
/// reported under the link's own path; symlinked directories are not
/// descended into. Result order follows the walk and is not meaningful.
pub fn world_writable(root: &Path, opts: &WalkOptions) -> Result<DirScan, CheckError> {
    if !platform::supports_other_write() {
        return Err(CheckError::UnsupportedPlatform {
            op: "world-writable 走査",
        });
    }

    let meta = std::fs::metadata(root)
        .map_err(|err| CheckError::file_system("ディレクトリの確認", root, err))?;
    if !meta.is_dir() {
        return Err(CheckError::file_system(
            "ディレクトリの確認",
            root,
            io::Error::new(io::ErrorKind::NotADirectory, "ディレクトリではありません"),
        ));
    }

    let exclude_set = build_exclude_set(&opts.exclude).map_err(|err| {
        CheckError::file_system(
            "exclude の構築",
            root,
            io::Error::new(io::ErrorKind::InvalidInput, format!("{err:#}")),
        )
    })?;

    let mut scan = DirScan {
        root: root.to_path_buf(),
        findings: Vec::new(),
        files_checked: 0,
        skipped_metadata: 0,
        skipped_unreadable: 0,
    };

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !exclude_set.is_match(e.path()));

    for entry in walker {
        if should_stop(opts) {
            return Err(CheckError::Cancelled {
                path: root.to_path_buf(),
            });
        }

        let outcome = match entry {
            Ok(entry) => classify(&entry),
            Err(err) if err.depth() == 0 => {
                return Err(CheckError::file_system(
                    "ディレクトリの読み取り",
                    root,
                    io::Error::from(err),
                ));
            }
            Err(_) => EntryOutcome::Skipped(SkipReason::Unreadable),
        };

        scan.record(outcome);
    }

    Ok(scan)
}

fn should_stop(opts: &WalkOptions) -> bool {
    if opts.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
        return true;
    }
    opts.deadline.is_some_and(|d| Instant::now() >= d)
}

fn classify(entry: &DirEntry) -> EntryOutcome {
    let file_type = entry.file_type();
    let meta = if file_type.is_file() {
        entry.metadata().map_err(io::Error::from)
    } else if file_type.is_symlink() {
        // judged by the target's mode, reported under the link's path
        std::fs::metadata(entry.path())
    } else {
        return EntryOutcome::NotAFile;
    };
    let meta = match meta {
        Ok(meta) => meta,
        Err(_) => return EntryOutcome::Skipped(SkipReason::Metadata),
    };
    if !meta.is_file() {
        return EntryOutcome::NotAFile;
    }
    match platform::others_can_write(&meta) {
        Some(true) => EntryOutcome::WorldWritable(entry.path().to_path_buf()),
        Some(false) => EntryOutcome::Clean,
        None => EntryOutcome::Skipped(SkipReason::Metadata),
    }
}

pub fn validate_excludes(excludes: &[String]) -> Result<()> {
    let _ = build_exclude_set(excludes)?;
    Ok(())
}

fn build_exclude_set(excludes: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in excludes {
        builder.add(Glob::new(pat).with_context(|| format!("exclude glob が不正です: {pat}"))?);
    }
    Ok(builder.build()?)
}
