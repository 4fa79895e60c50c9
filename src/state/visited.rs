//! Visit tracking for a single crawl run
//!
//! The sets live exactly as long as the run that owns them; nothing here is
//! persisted, so a new run starts from empty sets.

use std::collections::HashSet;
use std::fmt;

/// The kind of resource a visit key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitKind {
    /// A board page (entry URL of the board)
    Board,

    /// A thread (entry URL of its first page)
    Thread,

    /// A member profile page
    Member,

    /// A member's guestbook (entry URL of its first page)
    Guestbook,
}

impl VisitKind {
    /// Returns a short lowercase label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Thread => "thread",
            Self::Member => "member",
            Self::Guestbook => "guestbook",
        }
    }
}

impl fmt::Display for VisitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Disjoint membership sets of visited URLs, one per resource kind
///
/// A board URL and a thread URL never collide even if the strings are
/// equal, since each kind has its own set.
#[derive(Debug, Default, Clone)]
pub struct VisitedSets {
    boards: HashSet<String>,
    threads: HashSet<String>,
    members: HashSet<String>,
    guestbooks: HashSet<String>,
}

/// Distinct URLs visited per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitCounts {
    pub boards: usize,
    pub threads: usize,
    pub members: usize,
    pub guestbooks: usize,
}

impl VisitedSets {
    /// Creates empty visited sets
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, kind: VisitKind) -> &HashSet<String> {
        match kind {
            VisitKind::Board => &self.boards,
            VisitKind::Thread => &self.threads,
            VisitKind::Member => &self.members,
            VisitKind::Guestbook => &self.guestbooks,
        }
    }

    fn set_mut(&mut self, kind: VisitKind) -> &mut HashSet<String> {
        match kind {
            VisitKind::Board => &mut self.boards,
            VisitKind::Thread => &mut self.threads,
            VisitKind::Member => &mut self.members,
            VisitKind::Guestbook => &mut self.guestbooks,
        }
    }

    /// Marks a URL as visited
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not visited before and is now marked
    /// * `false` - The URL was already visited; the caller should skip it
    pub fn mark(&mut self, kind: VisitKind, url: &str) -> bool {
        self.set_mut(kind).insert(url.to_string())
    }

    /// Number of distinct URLs visited for a kind
    pub fn count(&self, kind: VisitKind) -> usize {
        self.set(kind).len()
    }

    /// Snapshot of every per-kind count
    pub fn counts(&self) -> VisitCounts {
        VisitCounts {
            boards: self.boards.len(),
            threads: self.threads.len(),
            members: self.members.len(),
            guestbooks: self.guestbooks.len(),
        }
    }
}
