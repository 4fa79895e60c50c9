use serde::Deserialize;

/// Main configuration structure for Forum-Archive
///
/// The session and root URL come from the command line; `site` and
/// `output` carry platform defaults that an optional TOML file can override.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory-style board index URL, always ending in `/`
    pub root_url: String,
    pub session: SessionConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// Authenticated session identification
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Value of the session cookie
    pub cookie_value: String,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Platform markup and naming conventions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Name of the session cookie
    #[serde(rename = "cookie-name")]
    pub cookie_name: String,

    /// Script filename the forum is served through
    #[serde(rename = "script-name")]
    pub script_name: String,

    /// Text only present on pages rendered for a signed-in member
    #[serde(rename = "auth-marker")]
    pub auth_marker: String,

    /// Substring of image sources that are platform smileys
    #[serde(rename = "smiley-pattern")]
    pub smiley_pattern: String,

    /// Substring of avatar sources that denote the default avatar
    #[serde(rename = "default-avatar-pattern")]
    pub default_avatar_pattern: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            cookie_name: "wcf_cookieHash".to_string(),
            script_name: "index.php".to_string(),
            auth_marker: "action=UserLogout".to_string(),
            smiley_pattern: "images/smilies/".to_string(),
            default_avatar_pattern: "avatar-default".to_string(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the archive database and downloaded files
    pub directory: String,

    /// Subdirectory for post attachments
    #[serde(rename = "attachments-dir")]
    pub attachments_dir: String,

    /// Subdirectory for member avatars
    #[serde(rename = "avatars-dir")]
    pub avatars_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            attachments_dir: "attachments".to_string(),
            avatars_dir: "userprofilepics".to_string(),
        }
    }
}

/// Shape of the optional TOML override file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
}
