use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Represents the complete configuration for semver-release.
///
/// Controls the synthetic identity used for release commits and annotated
/// tags, and the remote used when pushing.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Author/tagger identity for synthetic release commits and annotated tags.
///
/// Injected from configuration so tests can supply deterministic identities.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_name")]
    pub name: String,

    #[serde(default = "default_identity_email")]
    pub email: String,
}

fn default_identity_name() -> String {
    "semver-release".to_string()
}

fn default_identity_email() -> String {
    "semver-release@localhost".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig {
            name: default_identity_name(),
            email: default_identity_email(),
        }
    }
}

/// Remote settings for the push step of `release`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,

    /// Push tags after a successful release without requiring `--push`.
    #[serde(default)]
    pub push: bool,
}

fn default_remote_name() -> String {
    "origin".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            name: default_remote_name(),
            push: false,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `semver-release.toml` in current directory
/// 3. `~/.config/.semver-release.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(ReleaseConfig)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> crate::error::Result<ReleaseConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./semver-release.toml").exists() {
        fs::read_to_string("./semver-release.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".semver-release.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(ReleaseConfig::default());
        }
    } else {
        return Ok(ReleaseConfig::default());
    };

    let config: ReleaseConfig = toml::from_str(&config_str)
        .map_err(|e| crate::error::SemverReleaseError::config(e.to_string()))?;
    Ok(config)
}
