//! State module for tracking traversal progress
//!
//! This module holds the per-run traversal-session state that the driver
//! owns and threads through every crawl component.
//!
//! # Components
//!
//! - `VisitedSets`: process-lifetime membership sets for boards, threads, members and guestbooks
//! - `Progress`: breadcrumb describing the current position in the traversal

mod progress;
mod visited;

// Re-export main types
pub use progress::Progress;
pub use visited::{VisitCounts, VisitKind, VisitedSets};
