use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("{op}に失敗しました: {}", .path.display())]
    FileSystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ログファイルが見つかりません: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("{op}はこのプラットフォームでは対応していません（other-write ビットがありません）")]
    UnsupportedPlatform { op: &'static str },

    #[error("レポートの書き込みに失敗しました: {}", .path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("走査が中断されました: {}", .path.display())]
    Cancelled { path: PathBuf },
}

impl CheckError {
    pub fn file_system(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        CheckError::FileSystem {
            op,
            path: path.into(),
            source,
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            CheckError::FileSystem { .. } => "FILE_SYSTEM",
            CheckError::NotFound { .. } => "NOT_FOUND",
            CheckError::UnsupportedPlatform { .. } => "UNSUPPORTED_PLATFORM",
            CheckError::ReportWrite { .. } => "REPORT_WRITE",
            CheckError::Cancelled { .. } => "CANCELLED",
        }
    }
}
