//! Database schema definitions
//!
//! This module contains all SQL schema definitions for a Forum-Archive database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track archive runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    root_url TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per thread, path derived from traversal order
CREATE TABLE IF NOT EXISTS threads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL
);

-- Member profiles; id is the platform user id when known
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    profilePicPath TEXT NOT NULL DEFAULT '',
    info TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS guestbook_entries (
    user INTEGER,
    username TEXT NOT NULL,
    author INTEGER,
    authorname TEXT NOT NULL,
    timestamp INTEGER,
    message TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_guestbook_user ON guestbook_entries(user);

-- user holds a users.id; members are archived after the boards, so it is
-- not declared as an enforced foreign key
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    thread INTEGER NOT NULL REFERENCES threads(id),
    user INTEGER,
    username TEXT NOT NULL,
    timestamp INTEGER,
    message TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_thread ON posts(thread);
CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
