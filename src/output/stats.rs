//! Statistics generation from the archive database
//!
//! This module provides functionality for extracting and displaying
//! archive statistics from the storage layer.

use crate::storage::{Storage, StorageResult};

/// Archive statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveStatistics {
    /// Number of archived threads
    pub threads: u64,

    /// Number of archived posts
    pub posts: u64,

    /// Posts stored without a parsable date
    pub posts_without_timestamp: u64,

    /// Number of archived member profiles
    pub users: u64,

    /// Number of archived guestbook entries
    pub guestbook_entries: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ArchiveStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<ArchiveStatistics> {
    Ok(ArchiveStatistics {
        threads: storage.count_threads()?,
        posts: storage.count_posts()?,
        posts_without_timestamp: storage.count_posts_without_timestamp()?,
        users: storage.count_users()?,
        guestbook_entries: storage.count_guestbook_entries()?,
    })
}

/// Logs statistics at info level
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ArchiveStatistics) {
    tracing::info!("=== Archive Statistics ===");
    tracing::info!("  Threads: {}", stats.threads);
    tracing::info!("  Posts: {}", stats.posts);
    if stats.posts_without_timestamp > 0 {
        let percentage = if stats.posts > 0 {
            (stats.posts_without_timestamp as f64 / stats.posts as f64) * 100.0
        } else {
            0.0
        };
        tracing::info!(
            "  Posts without date: {} ({:.1}%)",
            stats.posts_without_timestamp,
            percentage
        );
    }
    tracing::info!("  Members: {}", stats.users);
    tracing::info!("  Guestbook entries: {}", stats.guestbook_entries);
}
