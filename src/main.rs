use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use gitwiki::server::{router, WikiState};
use gitwiki::Repository;

/// A simple wiki using git as the storage back-end. Content is formatted
/// in Markdown syntax.
///
/// The wiki has no protections against malicious editing and no support
/// for multiple simultaneous editors.
#[derive(Parser)]
#[command(name = "gitwiki", version, about, verbatim_doc_comment)]
struct Cli {
    /// Local HTTP address to serve the wiki on
    #[arg(long = "http", default_value = "127.0.0.1:8000")]
    addr: String,

    /// Directory with the git repository containing wiki files
    #[arg(long = "wiki", default_value = "./files")]
    wiki: PathBuf,

    /// Directory with static theme assets, served under /theme/
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Log every git command before it runs
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if !cli.wiki.join(".git").exists() {
        anyhow::bail!(
            "{} is not a git repository (run `git init` there first)",
            cli.wiki.display()
        );
    }

    let repo = Repository::new(&cli.wiki, cli.verbose);
    let state = Arc::new(WikiState { repo });
    let app = router(state, cli.theme);

    let listener = TcpListener::bind(&cli.addr).await?;
    log::info!("Starting a server on {}...", cli.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
