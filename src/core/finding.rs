use std::path::PathBuf;

/// A file whose mode grants write access to users outside owner and group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileFinding {
    pub path: PathBuf,
}

impl FileFinding {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
