//! Authenticated HTTP session
//!
//! Every request carries the session cookie, the operator's User-Agent and
//! `Cache-Control: max-age=0`. Page fetches additionally verify that the
//! response was rendered for a signed-in member.

use crate::config::Config;
use crate::ArchiveError;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, COOKIE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client shared by page fetches and background downloads
///
/// # Arguments
///
/// * `config` - The archive configuration
///
/// # Returns
///
/// * `Ok(Client)` - Client carrying the session headers
/// * `Err(ArchiveError)` - A header value is not valid in HTTP or the client failed to build
///
/// # Example
///
/// ```no_run
/// use forum_archive::config::load_config;
/// use forum_archive::crawler::build_http_client;
///
/// let config = load_config("0929e19b", "Mozilla/5.0", "http://forum.test/de/forum/", None).unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, ArchiveError> {
    let header = |name: &str, value: &str| {
        HeaderValue::from_str(value)
            .map_err(|_| ArchiveError::Argument(format!("{} is not a valid header value", name)))
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        header(
            "Cookie",
            &format!("{}={}", config.site.cookie_name, config.session.cookie_value),
        )?,
    );
    headers.insert(USER_AGENT, header("User-Agent", &config.session.user_agent)?);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// A signed-in browsing session on the forum
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: Client,
    auth_marker: String,
}

impl SessionClient {
    pub fn new(client: Client, auth_marker: &str) -> Self {
        Self {
            client,
            auth_marker: auth_marker.to_string(),
        }
    }

    /// Fetches a page and checks the session is still authenticated
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Connection or body read failure | `Http` |
    /// | Non-success status | `HttpStatus` |
    /// | Authentication marker missing | `SessionInvalid` |
    ///
    /// All three are fatal for the run.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ArchiveError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ArchiveError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("{} returned {}", url, status);
            return Err(ArchiveError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ArchiveError::Http {
            url: url.to_string(),
            source,
        })?;

        if !body.contains(self.auth_marker.as_str()) {
            tracing::error!("{} was not rendered for a signed-in member", url);
            return Err(ArchiveError::SessionInvalid {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}
