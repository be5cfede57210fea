//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use eva_client::ClientSettings;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Collection API key.
    pub api_key: Option<String>,
    /// Whether tracking is enabled.
    pub enabled: bool,
    /// User reported with each session start.
    pub user_id: Option<String>,
    /// Application version reported with each session start.
    pub app_version: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("enabled", &self.enabled)
            .field("user_id", &self.user_id)
            .field("app_version", &self.app_version)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            enabled: true,
            user_id: None,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (EVA_*)
        figment = figment.merge(Env::prefixed("EVA_"));

        figment.extract()
    }

    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// Client settings for one-step initialization.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            api_key: self.api_key().unwrap_or_default().to_string(),
            enabled: self.enabled,
            user_id: self.user_id.clone(),
        }
    }
}

/// Returns the platform-specific config directory for eva.
///
/// On Linux: `~/.config/eva`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("eva"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_eva() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "eva");
    }

    #[test]
    fn test_default_config_is_enabled_without_key() {
        let config = Config::default();
        assert!(config.enabled);
        assert!(config.api_key().is_none());
        assert_eq!(config.app_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let config = Config {
            api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.api_key().is_none());
        assert_eq!(config.client_settings().api_key, "");
    }

    #[test]
    fn test_api_key_is_passed_through_verbatim() {
        let config = Config {
            api_key: Some(" key ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.api_key(), Some(" key "));
        assert_eq!(config.client_settings().api_key, " key ");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: Some("secret-key".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_key = \"file-key\"\nenabled = false\nuser_id = \"trainee-7\""
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.api_key(), Some("file-key"));
        assert!(!config.enabled);

        let settings = config.client_settings();
        assert_eq!(settings.user_id.as_deref(), Some("trainee-7"));
        assert!(!settings.enabled);
    }
}
