//! Git Mirror CLI
//!
//! Keeps a local directory synchronized with one branch of a remote git
//! repository. The local copy is non-authoritative and may be reset to the
//! remote on every run.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use mirror_core::{CancelToken, StdoutSink, SyncOptions, Synchronizer};

#[derive(Parser)]
#[command(
    name = "git-mirror",
    version,
    about = "Mirror a remote git branch into a local directory"
)]
struct Cli {
    /// Path of the directory to sync
    #[arg(long, value_name = "PATH")]
    repo: PathBuf,

    /// URL of the origin repository
    #[arg(long, value_name = "URL")]
    origin: String,

    /// Branch to sync with
    #[arg(long, env = "GIT_MIRROR_BRANCH", default_value = "master")]
    branch: String,

    /// Suppress progress output
    #[arg(long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> mirror_core::Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let mut options = SyncOptions::new().branch(&cli.branch);
    if !cli.quiet {
        options = options.progress(Arc::new(StdoutSink));
    }

    let sync = Synchronizer::new(&cli.repo, cli.origin, options);
    sync.synchronize(&CancelToken::new())
}
