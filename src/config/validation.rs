use crate::config::types::{Config, OutputConfig, SessionConfig, SiteConfig};
use crate::url::parse_http_url;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_root_url(&config.root_url, &config.site.script_name)?;
    validate_session_config(&config.session)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the root URL
///
/// It must be an absolute http(s) URL naming the board index directory.
/// A URL that still names the script is reported separately since the
/// driver maps it to its own exit code.
fn validate_root_url(root_url: &str, script_name: &str) -> Result<(), ConfigError> {
    parse_http_url(root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Root URL '{}': {}", root_url, e)))?;

    if !script_name.is_empty() && root_url.contains(script_name) {
        return Err(ConfigError::ScriptUrl(root_url.to_string()));
    }

    Ok(())
}

/// Validates session identification
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.cookie_value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "cookie value cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    // Both end up verbatim in request headers
    if config
        .cookie_value
        .chars()
        .chain(config.user_agent.chars())
        .any(|c| c == '\r' || c == '\n')
    {
        return Err(ConfigError::Validation(
            "cookie value and user agent must be single-line".to_string(),
        ));
    }

    Ok(())
}

/// Validates platform conventions
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.cookie_name.is_empty()
        || !config
            .cookie_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "cookie-name must be a non-empty token, got '{}'",
            config.cookie_name
        )));
    }

    if config.script_name.is_empty() {
        return Err(ConfigError::Validation(
            "script-name cannot be empty".to_string(),
        ));
    }

    // An empty marker would make every page look authenticated
    if config.auth_marker.is_empty() {
        return Err(ConfigError::Validation(
            "auth-marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    for (name, dir) in [
        ("attachments-dir", &config.attachments_dir),
        ("avatars-dir", &config.avatars_dir),
    ] {
        if dir.is_empty() || dir.starts_with('/') || dir.contains("..") {
            return Err(ConfigError::Validation(format!(
                "{} must be a relative subdirectory, got '{}'",
                name, dir
            )));
        }
    }

    Ok(())
}
