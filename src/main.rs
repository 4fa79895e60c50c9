//! Forum-Archive main entry point
//!
//! This is the command-line interface for the forum archiver.

use clap::Parser;
use forum_archive::config::load_config;
use forum_archive::crawler::archive;
use forum_archive::ArchiveError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Forum-Archive: archives a forum with a signed-in session
///
/// Walks the board tree, every thread, the member directory and all
/// guestbooks, and writes them into a fresh SQLite archive in the output
/// directory.
#[derive(Parser, Debug)]
#[command(name = "forum-archive")]
#[command(version)]
#[command(about = "Archives a forum into SQLite", long_about = None)]
struct Cli {
    /// Value of the session cookie of a signed-in browser
    #[arg(value_name = "COOKIE")]
    cookie: String,

    /// User-Agent of the browser the cookie belongs to
    #[arg(value_name = "USER_AGENT")]
    user_agent: String,

    /// Forum root directory, e.g. http://forum.example/de/forum
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Path to a TOML file overriding site conventions and output locations
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            // Help and version output go to stdout
            let _ = e.print();
            std::process::exit(code);
        }
    };

    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = handle_archive(cli).await {
        tracing::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forum_archive=info,warn"),
            1 => EnvFilter::new("forum_archive=debug,info"),
            2 => EnvFilter::new("forum_archive=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the archive operation
async fn handle_archive(cli: Cli) -> Result<(), ArchiveError> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading overrides from: {}", path.display());
    }
    let config = load_config(
        &cli.cookie,
        &cli.user_agent,
        &cli.root_url,
        cli.config.as_deref(),
    )?;

    let summary = archive(config).await?;
    tracing::info!(
        "Archive completed: {} ({} threads, {} posts, {} members)",
        summary.archive_path.display(),
        summary.statistics.threads,
        summary.statistics.posts,
        summary.statistics.users
    );

    Ok(())
}
