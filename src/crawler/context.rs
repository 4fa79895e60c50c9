use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::crawler::downloads::Downloads;
use crate::crawler::normalize::MessageNormalizer;
use crate::crawler::session::SessionClient;
use crate::state::VisitedSets;
use crate::storage::Storage;

/// Where downloaded files land, and how rows refer to them
#[derive(Debug, Clone)]
pub struct OutputLayout {
    directory: PathBuf,
    attachments_dir: String,
    avatars_dir: String,
}

impl OutputLayout {
    pub fn new(config: &Config) -> Self {
        Self {
            directory: PathBuf::from(&config.output.directory),
            attachments_dir: config.output.attachments_dir.clone(),
            avatars_dir: config.output.avatars_dir.clone(),
        }
    }

    /// Output root holding the archive database
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Creates the output root and both download directories
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.directory.join(&self.attachments_dir))?;
        std::fs::create_dir_all(self.directory.join(&self.avatars_dir))?;
        Ok(())
    }

    /// Relative path stored in post bodies, e.g. `attachments/991`
    pub fn attachment_reference(&self, id: i64) -> String {
        format!("{}/{}", self.attachments_dir, id)
    }

    /// Relative path stored as a member's profile picture
    pub fn avatar_reference(&self, file_name: &str) -> String {
        format!("{}/{}", self.avatars_dir, file_name)
    }

    /// Resolves a stored relative path below the output root
    pub fn local_path(&self, reference: &str) -> PathBuf {
        self.directory.join(reference)
    }
}

/// Borrowed state for one crawl pass
///
/// The driver owns every piece; a pass borrows them for its duration.
pub struct CrawlContext<'a> {
    pub session: &'a SessionClient,
    pub downloads: &'a mut Downloads,
    pub visited: &'a mut VisitedSets,
    pub storage: &'a mut dyn Storage,
    pub normalizer: &'a MessageNormalizer,
    pub layout: &'a OutputLayout,
}

/// Builds a `{parent}/{index} {title}` display path
///
/// The index is 1-based and zero-padded to five digits.
///
/// # Examples
///
/// ```
/// use forum_archive::crawler::child_path;
///
/// assert_eq!(child_path("", 1, "Sub"), "/00001 Sub");
/// assert_eq!(child_path("/00001 Sub", 12, "Topic"), "/00001 Sub/00012 Topic");
/// ```
pub fn child_path(parent: &str, index: usize, title: &str) -> String {
    format!("{}/{:05} {}", parent, index, title)
}
