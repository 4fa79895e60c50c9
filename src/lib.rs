//! Forum-Archive: an authenticated forum archiver
//!
//! This crate walks a forum's board tree, threads, member profiles and
//! guestbooks with a signed-in session and writes everything it finds into
//! a fresh SQLite archive.

pub mod config;
pub mod crawler;
pub mod output;
pub mod pages;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Forum-Archive operations
///
/// Every variant here is fatal for a run. Failures that only cost a single
/// record (timestamp parsing, row inserts, background downloads) are logged
/// where they happen and never reach this type.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid arguments: {0}")]
    Argument(String),

    #[error("Session is not authenticated (marker missing) at {url}")]
    SessionInvalid { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Process exit code reported by the command-line driver
    ///
    /// | Condition | Code |
    /// |-----------|------|
    /// | Non-success HTTP status | the status itself |
    /// | Authentication marker missing | 403 |
    /// | Root URL names the script | 4 |
    /// | Anything else | 1 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HttpStatus { status, .. } => i32::from(*status),
            Self::SessionInvalid { .. } => 403,
            Self::Config(ConfigError::ScriptUrl(_)) => 4,
            _ => 1,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Root URL still contains the script filename: {0}")]
    ScriptUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Forum-Archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Archiver;
pub use state::{Progress, VisitedSets};
