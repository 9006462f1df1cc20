use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Keyword {
    Failed,
    Error,
    Denied,
}

impl Keyword {
    pub const ALL: [Keyword; 3] = [Keyword::Failed, Keyword::Error, Keyword::Denied];

    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::Failed => "FAILED",
            Keyword::Error => "ERROR",
            Keyword::Denied => "DENIED",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occurrence counts for the closed keyword set. Every keyword is always
/// present and starts at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCounts {
    #[serde(rename = "FAILED")]
    pub failed: u64,
    #[serde(rename = "ERROR")]
    pub error: u64,
    #[serde(rename = "DENIED")]
    pub denied: u64,
}

impl KeywordCounts {
    pub const fn get(&self, keyword: Keyword) -> u64 {
        match keyword {
            Keyword::Failed => self.failed,
            Keyword::Error => self.error,
            Keyword::Denied => self.denied,
        }
    }

    pub fn record(&mut self, keyword: Keyword) {
        let slot = match keyword {
            Keyword::Failed => &mut self.failed,
            Keyword::Error => &mut self.error,
            Keyword::Denied => &mut self.denied,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        Keyword::ALL
            .iter()
            .fold(0u64, |acc, k| acc.saturating_add(self.get(*k)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Keyword, u64)> + '_ {
        Keyword::ALL.into_iter().map(|k| (k, self.get(k)))
    }
}
