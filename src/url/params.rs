/// Extracts a numeric id carried in a URL's query string
///
/// Works on absolute and relative hrefs alike, since only the part after
/// `?` is inspected.
///
/// # Examples
///
/// ```
/// use forum_archive::url::query_id;
///
/// assert_eq!(query_id("index.php?page=Attachment&attachmentID=991", "attachmentID"), Some(991));
/// assert_eq!(query_id("index.php?page=User", "userID"), None);
/// ```
pub fn query_id(href: &str, key: &str) -> Option<i64> {
    let query = href.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| v.trim().parse().ok())
}
