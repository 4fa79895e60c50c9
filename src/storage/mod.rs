//! Storage module for persisting archive data
//!
//! This module handles all database operations for the archiver, including:
//! - Creating a fresh SQLite archive per run
//! - Thread, post, member and guestbook persistence
//! - Run bookkeeping

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{archive_file_name, SqliteStorage};
pub use traits::{Storage, StorageError, StorageResult};

/// A thread row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    pub id: i64,
    pub path: String,
}

/// A post about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub thread_id: i64,
    pub user_id: Option<i64>,
    pub username: String,
    /// Epoch seconds, None when the date string could not be parsed
    pub timestamp: Option<i64>,
    pub message: String,
}

/// A post row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: i64,
    pub thread_id: i64,
    pub user_id: Option<i64>,
    pub username: String,
    pub timestamp: Option<i64>,
    pub message: String,
}

/// A member profile about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: Option<i64>,
    pub name: String,
    /// Relative path of the downloaded avatar, empty for the default avatar
    pub profile_pic_path: String,
    pub info: String,
}

/// A member row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub profile_pic_path: String,
    pub info: String,
}

/// A guestbook entry
///
/// `user` and `author` are best-effort numeric references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuestbookEntry {
    pub user: Option<i64>,
    pub username: String,
    pub author: Option<i64>,
    pub authorname: String,
    pub timestamp: Option<i64>,
    pub message: String,
}

/// Represents an archive run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub root_url: String,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of an archive run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
