//! gitwiki — a small wiki serving Markdown pages out of a git repository.
//!
//! The git repository is the single durable store: page content lives in
//! tracked `.md` files and page history is whatever `git log` reports.
//! Nothing is cached in memory across requests; every request re-reads
//! through the git CLI.

pub mod history;
pub mod listing;
pub mod page;
pub mod render;
pub mod server;
pub mod store;

pub use page::Page;
pub use store::Repository;
