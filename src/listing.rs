//! Glob listing over the committed tree
//!
//! Directory views enumerate pages by listing the repository's committed
//! tree, not the working directory: a file written to disk but never
//! committed is invisible here by design.

use futures_util::future::join_all;
use glob::{MatchOptions, Pattern};
use regex::Regex;

use crate::page::{clean_path, Page, PAGE_EXTENSION};
use crate::store::Repository;

/// Errors from a glob listing call.
///
/// A malformed pattern is the one failure that aborts the whole listing;
/// individual page load failures are absorbed as empty content.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}

/// List every committed page matching a shell-style glob pattern.
///
/// The pattern is cleaned (leading slash stripped, `.`/`..` collapsed) and
/// matched against blob paths from `git ls-tree HEAD` under the pattern's
/// parent directory. Wildcards stay within one path segment; there is no
/// recursive `**`. Matching pages have their content loaded concurrently,
/// and the call returns only once every load has finished. Result order is
/// the order entries appear in the tree listing.
pub async fn list_pages(repo: &Repository, pattern: &str) -> Result<Vec<Page>, ListError> {
    let cleaned = clean_path(pattern);
    let matcher = Pattern::new(&cleaned).map_err(|source| ListError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };

    let parent = match cleaned.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/"),
        None => "./".to_string(),
    };
    let stdout = repo.run_or_empty(&["ls-tree", "HEAD", "--", &parent]).await;
    let listing = String::from_utf8_lossy(&stdout);

    // Example `git ls-tree` lines (blob is a file, tree a directory):
    //
    // 040000 tree ef240d2545ebf7e8a04ff09b9a0b5686782c06e4	theme
    // 100644 blob bb3b016d78458c9b8ef1549597e77f44529905fc	index.md
    let re = Regex::new(r"(\S+) (\S+) (\S+)\t(.*)").unwrap();
    let mut pages: Vec<Page> = Vec::new();
    for line in listing.lines() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let (kind, file) = (&caps[2], &caps[4]);
        if kind != "blob" || !file.ends_with(PAGE_EXTENSION) {
            continue;
        }
        if !matcher.matches_with(file, options) {
            continue;
        }
        pages.push(Page::new(file.strip_suffix(PAGE_EXTENSION).unwrap_or(file)));
    }

    // Fan out one load per page and join them all; each task writes only
    // to its own page, and a failed load leaves that page's content empty.
    join_all(pages.iter_mut().map(|page| page.load_revision(repo))).await;

    Ok(pages)
}
