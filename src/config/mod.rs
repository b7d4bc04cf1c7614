//
//  apigee-cli
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads and saves the CLI configuration, a TOML file stored in the
//! platform-specific configuration directory.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/apigee/config.toml`
//! - **macOS**: `~/Library/Application Support/apigee/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\apigee\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! base_url = "https://api.enterprise.apigee.com"
//! organization = "myorg"
//! username = "ci@example.com"
//! default_environment = "test"
//! timeout_secs = 300
//! ```
//!
//! Command-line flags and `APIGEE_*` environment variables take precedence
//! over every value in the file. Passwords are never written here; see
//! [`KeyringStore`](crate::auth::KeyringStore).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Default management API endpoint of Apigee Edge cloud.
pub const DEFAULT_BASE_URL: &str = "https://api.enterprise.apigee.com";

/// Default request timeout in seconds.
///
/// Installing Node.js modules into a revision can take minutes.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "base_url",
    "organization",
    "username",
    "default_environment",
    "timeout_secs",
];

/// Configuration for the Apigee CLI.
///
/// All fields use `#[serde(default)]`, so a partial or empty file is valid.
///
/// # Examples
///
/// ```rust
/// use apigee_cli::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.base_url, "https://api.enterprise.apigee.com");
/// assert_eq!(config.timeout_secs, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the management API, without the `/v1` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default organization.
    #[serde(default)]
    pub organization: Option<String>,

    /// Default username for Basic authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// Environment used when a command needs one and none is given.
    #[serde(default)]
    pub default_environment: Option<String>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            organization: None,
            username: None,
            default_environment: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads configuration from the default location.
    ///
    /// A missing file is not an error; defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to an explicit path, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// The file may not exist; this only returns where it would be.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "apigee")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Host part of the base URL, used to key stored passwords.
    ///
    /// ```rust
    /// use apigee_cli::config::Config;
    ///
    /// let config = Config {
    ///     base_url: "https://Apigee.Example.com:8443/".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.host().as_deref(), Some("apigee.example.com"));
    /// ```
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
    }

    /// Gets a configuration value by key.
    ///
    /// Returns `None` for unknown keys and for unset optional values.
    ///
    /// ```rust
    /// use apigee_cli::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.get("timeout_secs"), Some("300".to_string()));
    /// assert_eq!(config.get("organization"), None);
    /// assert_eq!(config.get("unknown_key"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base_url" => Some(self.base_url.clone()),
            "organization" => self.organization.clone(),
            "username" => self.username.clone(),
            "default_environment" => self.default_environment.clone(),
            "timeout_secs" => Some(self.timeout_secs.to_string()),
            _ => None,
        }
    }

    /// Sets a configuration value by key.
    ///
    /// Changes are only persisted when [`Config::save`] is called.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, a `base_url` that is not an
    /// absolute URL, or a `timeout_secs` that is not a positive integer.
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "base_url" => {
                if let Err(e) = url::Url::parse(&value) {
                    bail!("Invalid base_url '{}': {}", value, e);
                }
                self.base_url = value;
            }
            "organization" => self.organization = non_empty(value),
            "username" => self.username = non_empty(value),
            "default_environment" => self.default_environment = non_empty(value),
            "timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("timeout_secs must be a number of seconds"))?;
                if secs == 0 {
                    bail!("timeout_secs must be greater than zero");
                }
                self.timeout_secs = secs;
            }
            _ => bail!(
                "Unknown configuration key '{}'. Valid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("organization = \"myorg\"\n").unwrap();
        assert_eq!(config.organization.as_deref(), Some("myorg"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("organization", "myorg".to_string()).unwrap();
        config.set("username", "ci@example.com".to_string()).unwrap();
        config.set("timeout_secs", "600".to_string()).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"https://apigee.internal.example.com\"\norganization = [\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        assert!(config.set("base_url", "not a url".to_string()).is_err());
        assert!(config.set("timeout_secs", "0".to_string()).is_err());
        assert!(config.set("timeout_secs", "soon".to_string()).is_err());
        assert!(config.set("colour", "blue".to_string()).is_err());

        config.set("default_environment", "dev".to_string()).unwrap();
        assert_eq!(config.get("default_environment").as_deref(), Some("dev"));
        config.set("default_environment", String::new()).unwrap();
        assert_eq!(config.get("default_environment"), None);
    }
}
