//! Parsing of `git log` output
//!
//! The wiki reads history through `git log --pretty=format:'%h %ad %s'
//! --date=relative`, which emits one line per commit of the fixed shape
//! `<short-hash> <relative-time> <message>`.

use regex::Regex;
use serde::Serialize;

/// One historical revision of a page, as reported by `git log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revision {
    /// Abbreviated commit hash (`%h`, up to 7 characters).
    pub hash: String,
    /// Relative timestamp such as `28 hours ago` (`%ad` with `--date=relative`).
    pub time: String,
    /// Commit subject line (`%s`).
    pub message: String,
}

/// Parse one `git log` line into a [`Revision`].
///
/// Returns `None` for lines that do not match the expected shape; callers
/// drop those silently (blank lines at the end of output are normal).
pub fn parse_log_line(line: &str) -> Option<Revision> {
    let re = Regex::new(r"(.{0,7}) (\d+ \w+ ago) (.*)").unwrap();
    let caps = re.captures(line)?;
    Some(Revision {
        hash: caps[1].to_string(),
        time: caps[2].to_string(),
        message: caps[3].to_string(),
    })
}
