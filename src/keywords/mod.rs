use std::borrow::Cow;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{CheckError, Keyword, KeywordCounts, LogStatus};

// One capture group per keyword so the match maps back without re-casing
// the matched text.
static KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(failed)|(error)|(denied))\b").expect("keyword pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogScan {
    pub path: PathBuf,
    pub status: LogStatus,
    pub lines: u64,
    pub counts: KeywordCounts,
}

impl LogScan {
    pub fn is_not_found(&self) -> bool {
        self.status == LogStatus::NotFound
    }

    /// The `NotFound` signal for a missing log, for callers that surface it.
    pub fn not_found_error(&self) -> Option<CheckError> {
        self.is_not_found().then(|| CheckError::NotFound {
            path: self.path.clone(),
        })
    }
}

/// Counts FAILED/ERROR/DENIED in the log at `path`.
///
/// A missing file is not an error: it yields zero counts with
/// [`LogStatus::NotFound`]. Other read failures are returned as
/// [`CheckError::FileSystem`].
pub fn scan_log(path: &Path) -> Result<LogScan, CheckError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(LogScan {
                path: path.to_path_buf(),
                status: LogStatus::NotFound,
                lines: 0,
                counts: KeywordCounts::default(),
            });
        }
        Err(err) => return Err(CheckError::file_system("ログファイルのオープン", path, err)),
    };

    let (counts, lines) = count_keywords(BufReader::new(file))
        .map_err(|err| CheckError::file_system("ログファイルの読み取り", path, err))?;

    Ok(LogScan {
        path: path.to_path_buf(),
        status: LogStatus::Scanned,
        lines,
        counts,
    })
}

/// Counts keywords line by line. Returns the counts and the number of lines
/// read.
pub fn count_keywords<R: BufRead>(mut reader: R) -> io::Result<(KeywordCounts, u64)> {
    let mut counts = KeywordCounts::default();
    let mut lines: u64 = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        lines = lines.saturating_add(1);
        count_line(&decode_dropping_invalid(&buf), &mut counts);
    }

    Ok((counts, lines))
}

pub fn count_line(line: &str, counts: &mut KeywordCounts) {
    for caps in KEYWORD_PATTERN.captures_iter(line) {
        let keyword = if caps.get(1).is_some() {
            Keyword::Failed
        } else if caps.get(2).is_some() {
            Keyword::Error
        } else {
            Keyword::Denied
        };
        counts.record(keyword);
    }
}

fn decode_dropping_invalid(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    Cow::Owned(out)
}
