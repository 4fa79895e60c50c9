use crate::{UrlError, UrlResult};
use url::Url;

/// Query parameters that vary between requests for the same resource
///
/// `s` carries the platform's per-session id when cookies are not trusted.
const VOLATILE_PARAMS: &[&str] = &["s", "sid"];

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be ignored:
/// - javascript:, mailto:, tel:, data: schemes
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use url::Url;
/// use forum_archive::url::resolve_link;
///
/// let base = Url::parse("http://forum.test/de/forum/").unwrap();
/// let link = resolve_link("index.php?page=Board&boardID=3", &base).unwrap();
/// assert_eq!(link.as_str(), "http://forum.test/de/forum/index.php?page=Board&boardID=3");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url)
    } else {
        None
    }
}

/// Parses an absolute http(s) URL with a host
///
/// # Examples
///
/// ```
/// use forum_archive::url::parse_http_url;
///
/// assert!(parse_http_url("http://forum.test/de/forum/").is_ok());
/// assert!(parse_http_url("ftp://forum.test/").is_err());
/// ```
pub fn parse_http_url(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Reduces a URL to the key used for visit tracking
///
/// The fragment and session-id parameters are dropped; every other
/// parameter keeps its position so page URLs built from the key stay valid.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use forum_archive::url::canonical_url;
///
/// let url = Url::parse("http://forum.test/index.php?page=Thread&threadID=7&s=ab12#post3").unwrap();
/// assert_eq!(
///     canonical_url(&url).as_str(),
///     "http://forum.test/index.php?page=Thread&threadID=7"
/// );
/// ```
pub fn canonical_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);

    let has_volatile = url
        .query_pairs()
        .any(|(key, _)| VOLATILE_PARAMS.contains(&key.as_ref()));

    if has_volatile {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !VOLATILE_PARAMS.contains(&key.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url_rejects() {
        assert!(matches!(parse_http_url("not a url"), Err(UrlError::Parse(_))));
        assert!(matches!(
            parse_http_url("file:///etc/passwd"),
            Err(UrlError::InvalidScheme(s)) if s == "file"
        ));
        assert!(parse_http_url(" https://forum.test/ ").is_ok());
    }

    fn base_url() -> Url {
        Url::parse("http://forum.test/de/forum/index.php?page=Index").unwrap()
    }

    #[test]
    fn test_resolve_relative_link() {
        let link = resolve_link("index.php?page=Board&boardID=2", &base_url()).unwrap();
        assert_eq!(
            link.as_str(),
            "http://forum.test/de/forum/index.php?page=Board&boardID=2"
        );
    }

    #[test]
    fn test_resolve_absolute_link() {
        let link = resolve_link("https://other.test/x", &base_url()).unwrap();
        assert_eq!(link.as_str(), "https://other.test/x");
    }

    #[test]
    fn test_skip_special_schemes() {
        assert!(resolve_link("javascript:void(0)", &base_url()).is_none());
        assert!(resolve_link("mailto:admin@forum.test", &base_url()).is_none());
        assert!(resolve_link("#top", &base_url()).is_none());
        assert!(resolve_link("   ", &base_url()).is_none());
    }

    #[test]
    fn test_canonical_drops_session_and_fragment() {
        let url =
            Url::parse("http://forum.test/index.php?s=deadbeef&page=Board&boardID=4#top").unwrap();
        assert_eq!(
            canonical_url(&url).as_str(),
            "http://forum.test/index.php?page=Board&boardID=4"
        );
    }

    #[test]
    fn test_canonical_keeps_parameter_order() {
        let url = Url::parse("http://forum.test/index.php?page=Thread&threadID=9").unwrap();
        assert_eq!(canonical_url(&url), url);
    }

    #[test]
    fn test_canonical_removes_empty_query() {
        let url = Url::parse("http://forum.test/?s=deadbeef").unwrap();
        assert_eq!(canonical_url(&url).as_str(), "http://forum.test/");
    }
}
