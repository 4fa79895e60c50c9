use std::fmt;

/// Breadcrumb describing the current position in a traversal
///
/// Each step returns a new value with one more `, <step> i/n` suffix, so a
/// caller can hand a child its own breadcrumb without touching its own.
/// The breadcrumb is only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress(String);

impl Progress {
    /// Starts a breadcrumb with a label, e.g. `root` or `members`
    pub fn new(label: &str) -> Self {
        Self(label.to_string())
    }

    /// Breadcrumb for the board traversal root
    pub fn root() -> Self {
        Self::new("root")
    }

    fn step(&self, name: &str, index: usize, total: usize) -> Self {
        Self(format!("{}, {} {}/{}", self.0, name, index, total))
    }

    /// Appends `, board i/n`
    pub fn board(&self, index: usize, total: usize) -> Self {
        self.step("board", index, total)
    }

    /// Appends `, page i/n`
    pub fn page(&self, index: usize, total: usize) -> Self {
        self.step("page", index, total)
    }

    /// Appends `, thread i/n`
    pub fn thread(&self, index: usize, total: usize) -> Self {
        self.step("thread", index, total)
    }

    /// Appends `, member i/n`
    pub fn member(&self, index: usize, total: usize) -> Self {
        self.step("member", index, total)
    }

    /// The accumulated breadcrumb text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
