//! Output module for archive summaries
//!
//! This module handles:
//! - Counting what an archive holds
//! - Reporting those counts at the end of a run

pub mod stats;

pub use stats::{load_statistics, print_statistics, ArchiveStatistics};
