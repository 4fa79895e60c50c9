//! Background file downloads
//!
//! Attachments and avatars are streamed to disk in tokio tasks while the
//! crawl continues. Nobody awaits a single download; the driver drains the
//! whole set before closing the archive.

use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

/// Result counts after all downloads settled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub completed: usize,
    pub failed: usize,
}

/// Raw downloads in flight
///
/// Each destination is written by at most one task per run.
#[derive(Debug)]
pub struct Downloads {
    client: Client,
    tasks: JoinSet<bool>,
    queued: HashSet<PathBuf>,
}

impl Downloads {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            tasks: JoinSet::new(),
            queued: HashSet::new(),
        }
    }

    /// Starts streaming `url` into `dest` without waiting for it
    ///
    /// No session marker check is made: the body is not a rendered page.
    /// Failures are logged at warn level and otherwise dropped.
    ///
    /// Returns `false` without starting anything when `dest` was already
    /// queued earlier in the run.
    pub fn spawn(&mut self, url: &str, dest: PathBuf) -> bool {
        if !self.queued.insert(dest.clone()) {
            tracing::debug!("Already queued: {}", dest.display());
            return false;
        }

        let client = self.client.clone();
        let url = url.to_string();

        self.tasks.spawn(async move {
            match download_to(&client, &url, &dest).await {
                Ok(bytes) => {
                    tracing::debug!("Saved {} ({} bytes) to {}", url, bytes, dest.display());
                    true
                }
                Err(e) => {
                    tracing::warn!("Download of {} to {} failed: {}", url, dest.display(), e);
                    false
                }
            }
        });
        tracing::debug!("Downloads in flight: {}", self.tasks.len());
        true
    }

    /// Number of downloads not yet collected
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every outstanding download
    pub async fn wait_all(&mut self) -> DownloadSummary {
        let mut summary = DownloadSummary::default();

        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(true) => summary.completed += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    tracing::warn!("Download task join error: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[derive(Debug, thiserror::Error)]
enum DownloadError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

async fn download_to(client: &Client, url: &str, dest: &Path) -> Result<u64, DownloadError> {
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status(status.as_u16()));
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}
