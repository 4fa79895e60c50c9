//! Configuration module for Forum-Archive
//!
//! The session cookie, User-Agent and root URL are positional arguments.
//! Platform conventions (cookie name, script name, markers and patterns) and
//! output locations have defaults that an optional TOML file can override.
//!
//! # Example
//!
//! ```no_run
//! use forum_archive::config::load_config;
//!
//! let config = load_config(
//!     "0929e19bf86e9ae1664310447558481638e3ff92",
//!     "Mozilla/5.0 (X11; Linux x86_64)",
//!     "http://forum.example.com/de/forum",
//!     None,
//! )
//! .unwrap();
//! println!("Archiving {}", config.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FileConfig, OutputConfig, SessionConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config};
