//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{
    NewGuestbookEntry, NewPost, NewUser, PostRecord, RunRecord, RunStatus, ThreadRecord,
    UserRecord,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Archive file already exists: {0}")]
    AlreadyExists(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Records are written once and never updated; the only mutable rows are
/// the run bookkeeping rows.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run row in `running` state
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, root_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Sets the final status and finish timestamp of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Archive Records =====

    /// Inserts a thread and returns its store-assigned id
    fn insert_thread(&mut self, path: &str) -> StorageResult<i64>;

    /// Inserts a post belonging to an already-inserted thread
    fn insert_post(&mut self, post: &NewPost) -> StorageResult<i64>;

    /// Inserts a member profile
    ///
    /// Uses the platform user id as row id when given, otherwise the store
    /// assigns one. Returns the row id either way.
    fn insert_user(&mut self, user: &NewUser) -> StorageResult<i64>;

    /// Inserts a guestbook entry
    fn insert_guestbook_entry(&mut self, entry: &NewGuestbookEntry) -> StorageResult<()>;

    // ===== Queries =====

    /// Gets all threads in insertion order
    fn get_threads(&self) -> StorageResult<Vec<ThreadRecord>>;

    /// Gets all posts of a thread in insertion order
    fn get_posts(&self, thread_id: i64) -> StorageResult<Vec<PostRecord>>;

    /// Gets a member by id
    fn get_user(&self, user_id: i64) -> StorageResult<Option<UserRecord>>;

    /// Gets all guestbook entries written on a member's guestbook
    fn get_guestbook_entries(&self, user_id: i64) -> StorageResult<Vec<NewGuestbookEntry>>;

    // ===== Statistics =====

    /// Counts thread rows
    fn count_threads(&self) -> StorageResult<u64>;

    /// Counts post rows
    fn count_posts(&self) -> StorageResult<u64>;

    /// Counts posts whose timestamp could not be parsed
    fn count_posts_without_timestamp(&self) -> StorageResult<u64>;

    /// Counts member rows
    fn count_users(&self) -> StorageResult<u64>;

    /// Counts guestbook rows
    fn count_guestbook_entries(&self) -> StorageResult<u64>;
}
