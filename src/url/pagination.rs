use url::Url;

/// Query parameter selecting a page of a board, thread, or listing
pub const PAGE_PARAM: &str = "pageNo";

/// Builds the ordered page-URL list for a paginated resource
///
/// The first entry is the entry URL itself; pages 2..=n append
/// `pageNo=<n>`. A count of 0 or 1 yields only the entry URL.
///
/// # Examples
///
/// ```
/// use forum_archive::url::page_urls;
///
/// let pages = page_urls("http://forum.test/index.php?page=Thread&threadID=7", 3);
/// assert_eq!(pages, vec![
///     "http://forum.test/index.php?page=Thread&threadID=7".to_string(),
///     "http://forum.test/index.php?page=Thread&threadID=7&pageNo=2".to_string(),
///     "http://forum.test/index.php?page=Thread&threadID=7&pageNo=3".to_string(),
/// ]);
/// ```
pub fn page_urls(entry_url: &str, page_count: u32) -> Vec<String> {
    let separator = if entry_url.contains('?') { '&' } else { '?' };

    std::iter::once(entry_url.to_string())
        .chain((2..=page_count).map(|n| format!("{}{}{}={}", entry_url, separator, PAGE_PARAM, n)))
        .collect()
}

/// Builds a URL addressing the forum script below the root directory
///
/// # Arguments
///
/// * `root_url` - Directory-style root, ending in `/`
/// * `script_name` - Script filename, e.g. `index.php`
/// * `query` - Query string without the leading `?`
pub fn script_url(root_url: &Url, script_name: &str, query: &str) -> Result<Url, url::ParseError> {
    root_url.join(&format!("{}?{}", script_name, query))
}
