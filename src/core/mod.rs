mod error;
mod finding;
mod keyword;
mod report;

pub use error::CheckError;
pub use finding::FileFinding;
pub use keyword::{Keyword, KeywordCounts};
pub use report::{CheckSummary, LogStatus, ReportEntry};
