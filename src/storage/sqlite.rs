//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    NewGuestbookEntry, NewPost, NewUser, PostRecord, RunRecord, RunStatus, ThreadRecord,
    UserRecord,
};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new archive database
    ///
    /// Archives are never reused: if a file already exists at `path`
    /// this fails instead of appending to it.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the SQLite database file to create
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully created database
    /// * `Err(StorageError)` - File exists or could not be created
    pub fn create(path: &Path) -> StorageResult<Self> {
        if path.exists() {
            return Err(StorageError::AlreadyExists(path.display().to_string()));
        }
        Self::open(path)
    }

    /// Opens an archive database, creating the schema if needed
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Closes the database, flushing the write-ahead log
    pub fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, root_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, root_url, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, root_url, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, root_url, config_hash, status FROM runs WHERE id = ?1",
        )?;

        stmt.query_row(params![run_id], |row| {
            Ok(RunRecord {
                id: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                root_url: row.get(3)?,
                config_hash: row.get(4)?,
                status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
                    .unwrap_or(RunStatus::Failed),
            })
        })
        .optional()?
        .ok_or(StorageError::RunNotFound(run_id))
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Archive Records =====

    fn insert_thread(&mut self, path: &str) -> StorageResult<i64> {
        self.conn
            .execute("INSERT INTO threads (path) VALUES (?1)", params![path])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_post(&mut self, post: &NewPost) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO posts (thread, user, username, timestamp, message) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                post.thread_id,
                post.user_id,
                post.username,
                post.timestamp,
                post.message
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_user(&mut self, user: &NewUser) -> StorageResult<i64> {
        // A NULL id lets SQLite assign the next rowid
        self.conn.execute(
            "INSERT INTO users (id, name, profilePicPath, info) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.name, user.profile_pic_path, user.info],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_guestbook_entry(&mut self, entry: &NewGuestbookEntry) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO guestbook_entries (user, username, author, authorname, timestamp, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.user,
                entry.username,
                entry.author,
                entry.authorname,
                entry.timestamp,
                entry.message
            ],
        )?;
        Ok(())
    }

    // ===== Queries =====

    fn get_threads(&self) -> StorageResult<Vec<ThreadRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, path FROM threads ORDER BY id")?;

        let threads = stmt
            .query_map([], |row| {
                Ok(ThreadRecord {
                    id: row.get(0)?,
                    path: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(threads)
    }

    fn get_posts(&self, thread_id: i64) -> StorageResult<Vec<PostRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, thread, user, username, timestamp, message FROM posts
             WHERE thread = ?1 ORDER BY id",
        )?;

        let posts = stmt
            .query_map(params![thread_id], |row| {
                Ok(PostRecord {
                    id: row.get(0)?,
                    thread_id: row.get(1)?,
                    user_id: row.get(2)?,
                    username: row.get(3)?,
                    timestamp: row.get(4)?,
                    message: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    fn get_user(&self, user_id: i64) -> StorageResult<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, profilePicPath, info FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        profile_pic_path: row.get(2)?,
                        info: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }

    fn get_guestbook_entries(&self, user_id: i64) -> StorageResult<Vec<NewGuestbookEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT user, username, author, authorname, timestamp, message
             FROM guestbook_entries WHERE user = ?1 ORDER BY rowid",
        )?;

        let entries = stmt
            .query_map(params![user_id], |row| {
                Ok(NewGuestbookEntry {
                    user: row.get(0)?,
                    username: row.get(1)?,
                    author: row.get(2)?,
                    authorname: row.get(3)?,
                    timestamp: row.get(4)?,
                    message: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    // ===== Statistics =====

    fn count_threads(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM threads")
    }

    fn count_posts(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM posts")
    }

    fn count_posts_without_timestamp(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM posts WHERE timestamp IS NULL")
    }

    fn count_users(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM users")
    }

    fn count_guestbook_entries(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM guestbook_entries")
    }
}

/// File name of the archive for a run started at `started_at`
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use forum_archive::storage::archive_file_name;
///
/// let started = Utc.with_ymd_and_hms(2017, 3, 20, 15, 37, 0).unwrap();
/// assert_eq!(archive_file_name(&started), "archive-20170320-153700.sqlite");
/// ```
pub fn archive_file_name<Tz: TimeZone>(started_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("archive-{}.sqlite", started_at.format("%Y%m%d-%H%M%S"))
}
