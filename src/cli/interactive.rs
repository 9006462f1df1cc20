use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

/// Asks for a path on stderr and reads one line from stdin. `None` on EOF or
/// an empty answer.
pub(crate) fn prompt_path(prompt: &str) -> Result<Option<PathBuf>> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut input = String::new();
    let mut stdin = io::stdin().lock();
    let n = stdin.read_line(&mut input)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(parse_path_input(&input))
}

pub(crate) fn parse_path_input(input: &str) -> Option<PathBuf> {
    let s = input.trim();
    // terminals quote dragged-in paths
    let s = strip_matching_quotes(s, '"')
        .or_else(|| strip_matching_quotes(s, '\''))
        .unwrap_or(s)
        .trim();
    if s.is_empty() {
        return None;
    }
    Some(PathBuf::from(s))
}

fn strip_matching_quotes(s: &str, quote: char) -> Option<&str> {
    s.strip_prefix(quote)?.strip_suffix(quote)
}
