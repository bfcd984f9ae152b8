//! Git command execution
//!
//! Every durable operation in the wiki goes through the `git` command-line
//! tool, executed with the repository root as working directory. The git
//! object store is treated as opaque; only the CLI contract is used.

use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Errors from running a git command.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git {args:?} failed ({status}):\n{output}")]
    CommandFailed {
        args: Vec<String>,
        status: String,
        output: String,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A working-directory-rooted git repository, driven through the git CLI.
///
/// The repository must already be initialized; the wiki never runs
/// `git init` itself. A `Repository` is cheap to clone and carries no
/// open handles, only the root path and logging configuration.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    log_commands: bool,
}

impl Repository {
    /// Create a handle for the repository rooted at `root`.
    ///
    /// When `log_commands` is set, every git invocation is logged with its
    /// working directory and full argument vector before it runs.
    pub fn new(root: impl Into<PathBuf>, log_commands: bool) -> Self {
        Self {
            root: root.into(),
            log_commands,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a file tracked inside the repository.
    pub fn file_path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Run a git command and return its stdout.
    ///
    /// A non-zero exit status yields [`StoreError::CommandFailed`] carrying
    /// the argument vector and the combined stdout/stderr of the command.
    pub async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        if self.log_commands {
            log::info!("(wd: {}) git {}", self.root.display(), args.join(" "));
        }

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await?;

        if !output.status.success() {
            return Err(StoreError::CommandFailed {
                args: args.iter().map(|a| a.to_string()).collect(),
                status: output.status.to_string(),
                output: format!(
                    "{}\n{}",
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }

        Ok(output.stdout)
    }

    /// Run a git command, degrading failure to empty output.
    ///
    /// Page rendering must survive a missing file or unknown revision, so
    /// callers on the read/render path use this instead of [`Repository::run`]:
    /// the failure is logged and the caller sees no data.
    pub async fn run_or_empty(&self, args: &[&str]) -> Vec<u8> {
        match self.run(args).await {
            Ok(stdout) => stdout,
            Err(e) => {
                log::error!("{}", e);
                Vec::new()
            }
        }
    }
}
