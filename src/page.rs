//! Wiki pages
//!
//! A [`Page`] is one logical document bound to a single Markdown file in
//! the repository, at either the current head or a selected revision. It
//! is built fresh for every request and composes [`Repository`] commands
//! into page-level actions: save, load, history, revert, rename.

use serde::Serialize;

use crate::history::{parse_log_line, Revision};
use crate::store::{Repository, Result};

/// File extension backing every wiki page.
pub const PAGE_EXTENSION: &str = ".md";

/// Maximum number of history entries fetched per page.
const HISTORY_LIMIT: &str = "5";

/// One ancestor directory of a page, for breadcrumb navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Accumulated path prefix up to and including this segment.
    pub path: String,
    /// The segment itself.
    pub name: String,
}

/// A wiki page at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Logical URL path, with a leading slash (`/notes/todo`).
    pub path: String,
    /// Backing file path relative to the repository root (`notes/todo.md`).
    pub file: String,
    /// Page content at the selected revision. Empty when the file does not
    /// exist there or the read failed; the two are not distinguished.
    pub content: String,
    /// Selected revision hash. Empty means head; [`Page::load_history`]
    /// fills it in from the most recent log entry.
    pub revision: String,
    /// Ancestor directories of the page, outermost first.
    pub dirs: Vec<Breadcrumb>,
    /// Most-recent-first history, at most five entries per fetch.
    pub revisions: Vec<Revision>,
}

impl Page {
    /// Build a page for a logical path such as `/notes/todo`.
    ///
    /// The path is cleaned first; callers are expected to have rejected
    /// dot-leading segments already (see [`has_hidden_segment`]).
    pub fn new(path: &str) -> Self {
        let cleaned = clean_path(path);
        Self {
            path: format!("/{}", cleaned),
            file: format!("{}{}", cleaned, PAGE_EXTENSION),
            content: String::new(),
            revision: String::new(),
            dirs: breadcrumbs(&cleaned),
            revisions: Vec::new(),
        }
    }

    /// Whether the selected revision is the most recent one.
    ///
    /// Requires [`Page::load_history`] to have run; with no history at all
    /// this is false.
    pub fn is_head(&self) -> bool {
        !self.revisions.is_empty() && self.revision == self.revisions[0].hash
    }

    /// Write `content` to the backing file and commit it.
    ///
    /// Line endings are normalized to LF before persisting. If the write
    /// fails the commit is skipped entirely and the in-memory content keeps
    /// its pre-save value, so the rendered page reflects the last state
    /// actually persisted. A failed commit is logged and absorbed.
    ///
    /// An empty `message` falls back to `Update <file>`; an empty `author`
    /// leaves the commit under git's ambient identity.
    pub async fn save(
        &mut self,
        repo: &Repository,
        content: &str,
        message: &str,
        author: &str,
    ) -> Result<()> {
        let normalized = normalize_newlines(content);
        let full_path = repo.file_path(&self.file);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        log::debug!("writing {} bytes to {:?}", normalized.len(), full_path);
        tokio::fs::write(&full_path, normalized.as_bytes()).await?;
        self.content = normalized;

        let message = if message.is_empty() {
            format!("Update {}", self.file)
        } else {
            message.to_string()
        };
        repo.run_or_empty(&["add", "--", &self.file]).await;
        self.commit(repo, &message, author).await;
        Ok(())
    }

    /// Commit whatever is staged for this page.
    ///
    /// Used directly by the revert flow, where `git checkout` has already
    /// staged the restored content and there is nothing to write.
    pub async fn commit(&self, repo: &Repository, message: &str, author: &str) {
        if author.is_empty() {
            repo.run_or_empty(&["commit", "-m", message]).await;
        } else {
            let author_arg = format!("--author={} <wiki@localhost>", author);
            repo.run_or_empty(&["commit", "-m", message, &author_arg]).await;
        }
    }

    /// Load the page content as of the selected revision.
    ///
    /// An empty revision reads the staged (current) state. Content becomes
    /// the empty string when the file did not exist at that revision or the
    /// command failed.
    pub async fn load_revision(&mut self, repo: &Repository) {
        let spec = format!("{}:./{}", self.revision, self.file);
        let stdout = repo.run_or_empty(&["show", &spec]).await;
        self.content = String::from_utf8_lossy(&stdout).into_owned();
    }

    /// Load the most recent history entries for the page.
    ///
    /// Unparseable log lines are dropped. When no revision was selected,
    /// the most recent entry's hash is adopted as the selected revision.
    pub async fn load_history(&mut self, repo: &Repository) {
        let stdout = repo
            .run_or_empty(&[
                "log",
                "--pretty=format:%h %ad %s",
                "--date=relative",
                "-n",
                HISTORY_LIMIT,
                "--",
                &self.file,
            ])
            .await;
        let text = String::from_utf8_lossy(&stdout);
        self.revisions = text.lines().filter_map(parse_log_line).collect();
        if self.revision.is_empty() {
            if let Some(head) = self.revisions.first() {
                self.revision = head.hash.clone();
            }
        }
    }

    /// Restore the working-tree file to the selected revision.
    ///
    /// This touches only this one file and creates no commit by itself;
    /// callers follow up with [`Page::commit`] under a "Reverted to" message
    /// so the revert becomes new history.
    pub async fn revert(&self, repo: &Repository) {
        log::info!("Reverting {} to revision {}", self.file, self.revision);
        repo.run_or_empty(&["checkout", &self.revision, "--", &self.file])
            .await;
    }

    /// Move the page to a new logical path as a tracked rename and commit.
    ///
    /// If the underlying `git mv` fails, no commit is attempted and the
    /// page keeps its old path.
    pub async fn rename(&mut self, repo: &Repository, new_path: &str, author: &str) -> Result<()> {
        let target = clean_path(new_path);
        let new_file = format!("{}{}", target, PAGE_EXTENSION);
        if let Some(parent) = repo.file_path(&new_file).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        repo.run(&["mv", &self.file, &new_file]).await?;

        let message = format!("Renamed {} to {}", self.file, new_file);
        self.path = format!("/{}", target);
        self.file = new_file;
        self.dirs = breadcrumbs(&target);
        self.commit(repo, &message, author).await;
        Ok(())
    }
}

/// Normalize CR-LF and lone CR line endings to LF.
pub fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Clean a URL-style path: collapse `.` and `..` segments, drop empty
/// segments and the leading slash.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Whether any path segment starts with a dot.
///
/// Dot-leading segments are never resolvable to a page; this keeps `.git`
/// and other tool metadata out of reach, and is checked before any
/// repository command runs.
pub fn has_hidden_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}

/// Breadcrumb entries for a logical path, outermost directory first.
///
/// Each entry accumulates the path prefix up to and including its segment:
/// `test/test2` yields (`test`, `test`) then (`test/test2`, `test2`).
pub fn breadcrumbs(path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = Vec::new();
    let mut prefix = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(segment);
        crumbs.push(Breadcrumb {
            path: prefix.clone(),
            name: segment.to_string(),
        });
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::create_test_repo;

    #[test]
    fn test_breadcrumbs() {
        let crumbs = breadcrumbs("test/test2");
        assert_eq!(crumbs.len(), 2);
        assert_eq!(crumbs[0], Breadcrumb { path: "test".into(), name: "test".into() });
        assert_eq!(
            crumbs[1],
            Breadcrumb { path: "test/test2".into(), name: "test2".into() }
        );

        assert!(breadcrumbs("").is_empty());
        assert_eq!(breadcrumbs("single").len(), 1);
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/notes/todo"), "notes/todo");
        assert_eq!(clean_path("a/./b"), "a/b");
        assert_eq!(clean_path("a/../b"), "b");
        assert_eq!(clean_path("../../etc"), "etc");
        assert_eq!(clean_path("//double//slash/"), "double/slash");
    }

    #[test]
    fn test_has_hidden_segment() {
        assert!(has_hidden_segment(".git/config"));
        assert!(has_hidden_segment("notes/.hidden/page"));
        assert!(!has_hidden_segment("notes/visible"));
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_newlines("plain"), "plain");
    }

    #[test]
    fn test_new_page_paths() {
        let page = Page::new("/notes/todo");
        assert_eq!(page.path, "/notes/todo");
        assert_eq!(page.file, "notes/todo.md");
        assert_eq!(page.dirs.len(), 2);
        assert!(page.revision.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload_round_trip() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/hello");
        page.save(&repo, "Hello\r\nWorld\r", "", "").await.unwrap();
        assert_eq!(page.content, "Hello\nWorld\n");

        let mut reloaded = Page::new("/hello");
        reloaded.load_revision(&repo).await;
        reloaded.load_history(&repo).await;
        assert_eq!(reloaded.content, "Hello\nWorld\n");
        assert_eq!(reloaded.revisions.len(), 1);
        assert_eq!(reloaded.revisions[0].message, "Update hello.md");
        assert!(reloaded.is_head());
    }

    #[tokio::test]
    async fn test_save_nested_page_creates_directories() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/docs/guides/setup");
        page.save(&repo, "content", "Add setup guide", "").await.unwrap();

        let mut reloaded = Page::new("/docs/guides/setup");
        reloaded.load_revision(&repo).await;
        reloaded.load_history(&repo).await;
        assert_eq!(reloaded.content, "content");
        assert_eq!(reloaded.revisions[0].message, "Add setup guide");
    }

    #[tokio::test]
    async fn test_save_attaches_author() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/authored");
        page.save(&repo, "text", "", "Alice").await.unwrap();

        let out = repo
            .run(&["log", "--pretty=format:%an", "-n", "1", "--", "authored.md"])
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out).trim(), "Alice");
    }

    #[tokio::test]
    async fn test_unknown_revision_loads_empty_and_is_idempotent() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/hello");
        page.save(&repo, "content", "", "").await.unwrap();

        let mut view = Page::new("/hello");
        view.revision = "deadbee".to_string();
        view.load_revision(&repo).await;
        let first = view.content.clone();
        view.load_revision(&repo).await;
        assert_eq!(first, "");
        assert_eq!(view.content, first);
    }

    #[tokio::test]
    async fn test_history_is_capped_and_most_recent_first() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/busy");
        for i in 0..7 {
            page.save(&repo, &format!("version {i}"), &format!("commit {i}"), "")
                .await
                .unwrap();
        }

        let mut reloaded = Page::new("/busy");
        reloaded.load_history(&repo).await;
        assert_eq!(reloaded.revisions.len(), 5);
        assert_eq!(reloaded.revisions[0].message, "commit 6");
        assert_eq!(reloaded.revisions[4].message, "commit 2");
        // Head hash adopted onto the page
        assert_eq!(reloaded.revision, reloaded.revisions[0].hash);
    }

    #[tokio::test]
    async fn test_is_head_false_for_older_revision() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/hello");
        page.save(&repo, "v1", "first", "").await.unwrap();
        page.save(&repo, "v2", "second", "").await.unwrap();

        let mut view = Page::new("/hello");
        view.load_history(&repo).await;
        assert!(view.is_head());

        let mut old = Page::new("/hello");
        old.revision = view.revisions[1].hash.clone();
        old.load_history(&repo).await;
        assert!(!old.is_head());
    }

    #[tokio::test]
    async fn test_revert_then_commit_creates_new_head() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/hello");
        page.save(&repo, "v1", "first", "").await.unwrap();
        page.save(&repo, "v2", "second", "").await.unwrap();
        page.save(&repo, "v3", "third", "").await.unwrap();

        let mut history = Page::new("/hello");
        history.load_history(&repo).await;
        let v1_hash = history.revisions[2].hash.clone();

        let mut revert = Page::new("/hello");
        revert.revision = v1_hash.clone();
        revert.revert(&repo).await;
        revert
            .commit(&repo, &format!("Reverted to: {v1_hash}"), "")
            .await;

        let mut head = Page::new("/hello");
        head.load_revision(&repo).await;
        head.load_history(&repo).await;
        assert_eq!(head.content, "v1");
        assert_eq!(head.revisions.len(), 4);
        assert_eq!(head.revisions[0].message, format!("Reverted to: {v1_hash}"));
        // Older entries stay in place beneath the new head
        assert_eq!(head.revisions[1].message, "third");
        assert_eq!(head.revisions[3].message, "first");
        assert!(head.is_head());
    }

    #[tokio::test]
    async fn test_rename_moves_content_and_history() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/old");
        page.save(&repo, "body", "first", "").await.unwrap();
        page.rename(&repo, "/archive/new", "").await.unwrap();
        assert_eq!(page.path, "/archive/new");
        assert_eq!(page.file, "archive/new.md");

        let mut moved = Page::new("/archive/new");
        moved.load_revision(&repo).await;
        moved.load_history(&repo).await;
        assert_eq!(moved.content, "body");
        assert_eq!(moved.revisions[0].message, "Renamed old.md to archive/new.md");

        // The old path is gone from the committed tree
        let out = repo.run(&["ls-tree", "HEAD", "--", "old.md"]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_rename_failure_skips_commit() {
        let (_temp, repo) = create_test_repo();

        let mut page = Page::new("/missing");
        let err = page.rename(&repo, "/elsewhere", "").await;
        assert!(err.is_err());

        let out = repo.run_or_empty(&["log", "--oneline"]).await;
        assert!(out.is_empty());
    }
}
