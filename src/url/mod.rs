//! URL handling module for Forum-Archive
//!
//! This module provides link resolution, canonical visit keys, the forum's
//! page-numbering convention, and extraction of numeric ids from query
//! strings.

mod normalize;
mod pagination;
mod params;

// Re-export main functions
pub use normalize::{canonical_url, parse_http_url, resolve_link};
pub use pagination::{page_urls, script_url, PAGE_PARAM};
pub use params::query_id;
