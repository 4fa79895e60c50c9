use crate::config::types::{Config, FileConfig, SessionConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Builds the run configuration from the positional arguments
///
/// # Arguments
///
/// * `cookie_value` - Value of the authenticated session cookie
/// * `user_agent` - User-Agent header to identify with
/// * `root_url` - Directory-style board index URL
/// * `overrides` - Optional TOML file with `[site]` and `[output]` tables
///
/// # Returns
///
/// * `Ok(Config)` - Successfully built and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use forum_archive::config::load_config;
///
/// let config = load_config(
///     "cookie",
///     "Mozilla/5.0",
///     "http://forum.example.com/",
///     Some(Path::new("archive.toml")),
/// )
/// .unwrap();
/// println!("Output directory: {}", config.output.directory);
/// ```
pub fn load_config(
    cookie_value: &str,
    user_agent: &str,
    root_url: &str,
    overrides: Option<&Path>,
) -> Result<Config, ConfigError> {
    let file_config = match overrides {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<FileConfig>(&content)?
        }
        None => FileConfig::default(),
    };

    let root_url = root_url.trim();
    let root_url = if root_url.ends_with('/') {
        root_url.to_string()
    } else {
        format!("{}/", root_url)
    };

    let config = Config {
        root_url,
        session: SessionConfig {
            cookie_value: cookie_value.to_string(),
            user_agent: user_agent.to_string(),
        },
        site: file_config.site,
        output: file_config.output,
    };

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the non-secret settings of a configuration
///
/// The cookie value is left out so the hash can be stored in the archive.
///
/// # Returns
///
/// Hex-encoded SHA-256 hash
pub fn compute_config_hash(config: &Config) -> String {
    let mut hasher = Sha256::new();
    for field in [
        config.root_url.as_str(),
        config.session.user_agent.as_str(),
        config.site.cookie_name.as_str(),
        config.site.script_name.as_str(),
        config.site.auth_marker.as_str(),
        config.site.smiley_pattern.as_str(),
        config.site.default_avatar_pattern.as_str(),
        config.output.directory.as_str(),
        config.output.attachments_dir.as_str(),
        config.output.avatars_dir.as_str(),
    ] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
