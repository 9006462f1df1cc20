use std::fmt;

use crate::core::CheckError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    InvalidArgs,
    ScanFailed,
    ReportWriteFailed,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::InvalidArgs => 2,
            ExitCode::ScanFailed => 10,
            ExitCode::ReportWriteFailed => 30,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.err.source()
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    if let Some(check) = err.downcast_ref::<CheckError>() {
        return code_for(check).as_i32();
    }
    ExitCode::ScanFailed.as_i32()
}

pub const fn code_for(err: &CheckError) -> ExitCode {
    match err {
        CheckError::ReportWrite { .. } => ExitCode::ReportWriteFailed,
        // a missing log degrades to zero counts in the engine and is never
        // returned as a failure; the arm only keeps the match total
        CheckError::NotFound { .. } => ExitCode::ScanFailed,
        CheckError::FileSystem { .. }
        | CheckError::UnsupportedPlatform { .. }
        | CheckError::Cancelled { .. } => ExitCode::ScanFailed,
    }
}

pub fn check_failed(err: CheckError) -> anyhow::Error {
    let code = code_for(&err);
    ExitError::new(code, err.into()).into()
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_args_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, err).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn report_write_maps_to_its_own_code() {
        let err = check_failed(CheckError::ReportWrite {
            path: PathBuf::from("/nope/report.txt"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(exit_code(&err), 30);
    }

    #[test]
    fn scan_failures_map_to_scan_failed() {
        let err = check_failed(CheckError::file_system(
            "ディレクトリの確認",
            "/nope",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
        assert_eq!(exit_code(&err), 10);

        let err = check_failed(CheckError::UnsupportedPlatform { op: "scan" });
        assert_eq!(exit_code(&err), 10);
    }

    #[test]
    fn bare_check_error_is_still_classified() {
        let err: anyhow::Error = CheckError::ReportWrite {
            path: PathBuf::from("r.txt"),
            source: std::io::Error::from(std::io::ErrorKind::StorageFull),
        }
        .into();
        assert_eq!(exit_code(&err), 30);
        assert_eq!(exit_code(&invalid_args("bad")), 2);
    }
}
