//! Crawler module for archiving a forum
//!
//! This module contains the core archiving logic, including:
//! - The authenticated session and background downloads
//! - Date parsing and message normalization
//! - Board traversal, thread download and the member directory crawl
//! - Overall run coordination

mod board;
mod context;
mod coordinator;
mod downloads;
mod members;
mod normalize;
mod session;
mod thread;
mod timestamp;

pub use board::{BoardOutcome, BoardTraverser};
pub use context::{child_path, CrawlContext, OutputLayout};
pub use coordinator::{Archiver, RunSummary};
pub use downloads::{DownloadSummary, Downloads};
pub use members::{MemberDirectoryCrawler, MemberOutcome, MEMBERS_LIST_QUERY};
pub use normalize::{attachment_reference, MessageNormalizer, QUOTE_DIVIDER};
pub use session::{build_http_client, SessionClient};
pub use thread::{ThreadDownloader, ThreadOutcome};
pub use timestamp::{parse_timestamp, parse_timestamp_at, TimestampError};

use crate::config::Config;
use crate::ArchiveError;

/// Runs a complete archive operation
///
/// This is the main entry point for archiving a forum. It will:
/// 1. Create the output directories and a fresh archive database
/// 2. Build the authenticated HTTP client
/// 3. Traverse the board tree and download every thread
/// 4. Crawl the member directory and guestbooks
/// 5. Wait for background downloads and close the archive
///
/// # Arguments
///
/// * `config` - The archive configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Archive completed successfully
/// * `Err(ArchiveError)` - Archive failed; the run row is marked failed
pub async fn archive(config: Config) -> Result<RunSummary, ArchiveError> {
    Archiver::new(config)?.run().await
}
