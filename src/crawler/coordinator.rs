//! Archive driver
//!
//! Owns everything a run needs and runs the passes in order:
//! - Creating the output directories and a fresh archive database
//! - Traversing the board tree from the root
//! - Crawling the member directory
//! - Waiting for background downloads, finishing the run row and closing
//!   the store, on success and on fatal errors alike

use std::path::{Path, PathBuf};

use url::Url;

use crate::config::{compute_config_hash, Config};
use crate::crawler::board::{BoardOutcome, BoardTraverser};
use crate::crawler::context::{CrawlContext, OutputLayout};
use crate::crawler::downloads::{DownloadSummary, Downloads};
use crate::crawler::members::{MemberDirectoryCrawler, MemberOutcome};
use crate::crawler::normalize::MessageNormalizer;
use crate::crawler::session::{build_http_client, SessionClient};
use crate::output::{load_statistics, print_statistics, ArchiveStatistics};
use crate::state::{Progress, VisitCounts, VisitedSets};
use crate::storage::{archive_file_name, RunStatus, SqliteStorage, Storage, StorageResult};
use crate::url::parse_http_url;
use crate::ArchiveError;

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: i64,
    pub archive_path: PathBuf,
    pub boards: BoardOutcome,
    pub members: MemberOutcome,
    pub downloads: DownloadSummary,
    pub visits: VisitCounts,
    pub statistics: ArchiveStatistics,
}

/// Main archive driver
pub struct Archiver {
    config: Config,
    root_url: Url,
    storage: SqliteStorage,
    session: SessionClient,
    downloads: Downloads,
    visited: VisitedSets,
    normalizer: MessageNormalizer,
    layout: OutputLayout,
    archive_path: PathBuf,
    run_id: i64,
}

impl Archiver {
    /// Prepares a run
    ///
    /// Creates the output directories and a new timestamped archive and
    /// records the run as `running`.
    ///
    /// # Errors
    ///
    /// Fails if the archive file already exists, a directory cannot be
    /// created, or the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, ArchiveError> {
        let root_url = parse_http_url(&config.root_url)?;
        let layout = OutputLayout::new(&config);
        layout.create_dirs()?;

        let archive_path = layout
            .directory()
            .join(archive_file_name(&chrono::Local::now()));
        let mut storage = SqliteStorage::create(&archive_path)?;

        let config_hash = compute_config_hash(&config);
        let run_id = storage.create_run(&config.root_url, &config_hash)?;
        tracing::info!(
            "Archiving {} into {} (run {}, config {})",
            config.root_url,
            archive_path.display(),
            run_id,
            &config_hash[..12]
        );

        let client = build_http_client(&config)?;
        let session = SessionClient::new(client.clone(), &config.site.auth_marker);
        let normalizer = MessageNormalizer::new(&config.site.smiley_pattern);

        Ok(Self {
            config,
            root_url,
            storage,
            session,
            downloads: Downloads::new(client),
            visited: VisitedSets::new(),
            normalizer,
            layout,
            archive_path,
            run_id,
        })
    }

    /// Path of the archive database this run writes
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn storage(&self) -> &dyn Storage {
        &self.storage
    }

    pub fn visited(&self) -> &VisitedSets {
        &self.visited
    }

    fn context(&mut self) -> CrawlContext<'_> {
        CrawlContext {
            session: &self.session,
            downloads: &mut self.downloads,
            visited: &mut self.visited,
            storage: &mut self.storage,
            normalizer: &self.normalizer,
            layout: &self.layout,
        }
    }

    /// Traverses the whole board tree from the root
    pub async fn archive_boards(&mut self) -> Result<BoardOutcome, ArchiveError> {
        let root_url = self.root_url.clone();
        let mut ctx = self.context();
        BoardTraverser::new(&mut ctx)
            .traverse(&root_url, "", Progress::root())
            .await
    }

    /// Archives every member profile and guestbook
    pub async fn archive_members(&mut self) -> Result<MemberOutcome, ArchiveError> {
        let root_url = self.root_url.clone();
        let config = self.config.clone();
        let mut ctx = self.context();
        MemberDirectoryCrawler::new(&mut ctx, &config)
            .crawl_all(&root_url, &config.site.script_name)
            .await
    }

    /// Runs boards then members, then closes the archive
    ///
    /// Outstanding downloads are awaited and the run row is finished even
    /// when a pass failed; the pass error is returned afterwards.
    pub async fn run(mut self) -> Result<RunSummary, ArchiveError> {
        let start_time = std::time::Instant::now();
        let result = self.archive_all().await;

        let in_flight = self.downloads.in_flight();
        if in_flight > 0 {
            tracing::info!("Waiting for {} downloads", in_flight);
        }
        let downloads = self.downloads.wait_all().await;
        tracing::info!(
            "Downloads: {} completed, {} failed",
            downloads.completed,
            downloads.failed
        );

        let status = match &result {
            Ok(_) => RunStatus::Completed,
            Err(e) => {
                tracing::error!("Archive run {} failed: {}", self.run_id, e);
                RunStatus::Failed
            }
        };
        if let Err(e) = self.storage.finish_run(self.run_id, status) {
            tracing::error!("Failed to finish run {}: {}", self.run_id, e);
        }

        let statistics = match load_statistics(&self.storage) {
            Ok(stats) => {
                print_statistics(&stats);
                stats
            }
            Err(e) => {
                tracing::warn!("Failed to load statistics: {}", e);
                ArchiveStatistics::default()
            }
        };

        let visits = self.visited.counts();
        tracing::info!(
            "Visited {} boards, {} threads, {} members, {} guestbooks in {:?}",
            visits.boards,
            visits.threads,
            visits.members,
            visits.guestbooks,
            start_time.elapsed()
        );

        let run_id = self.run_id;
        let archive_path = self.archive_path.clone();
        let closed = self.storage.close();
        if let Err(e) = &closed {
            tracing::error!("Failed to close {}: {}", archive_path.display(), e);
        }

        let (boards, members) = settle(result, closed)?;
        Ok(RunSummary {
            run_id,
            archive_path,
            boards,
            members,
            downloads,
            visits,
            statistics,
        })
    }

    async fn archive_all(&mut self) -> Result<(BoardOutcome, MemberOutcome), ArchiveError> {
        let boards = self.archive_boards().await?;
        tracing::info!(
            "Boards done: {} boards, {} threads, {} posts ({} failed)",
            boards.boards,
            boards.threads,
            boards.posts_saved,
            boards.posts_failed
        );

        let members = self.archive_members().await?;
        tracing::info!(
            "Members done: {} members, {} guestbook entries",
            members.members,
            members.guestbook_entries
        );

        Ok((boards, members))
    }
}

/// A failed pass wins over a failed close, so its exit code survives
fn settle<T>(pass: Result<T, ArchiveError>, closed: StorageResult<()>) -> Result<T, ArchiveError> {
    let value = pass?;
    closed?;
    Ok(value)
}
