//! Configuration file management for storytime.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Storytime service endpoints and HTTP behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Storytime service API
    pub base_url: String,
    /// Base URL of the Storytime web app (story pages open here)
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
    /// Per-request timeout in seconds for upload and story creation
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    /// Returns the request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_web_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Audio recording and processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `storytime list-devices`
    /// - device name from `storytime list-devices`
    pub device: String,
    /// Recording sample rate in Hz (16000 is plenty for speech)
    pub sample_rate: u32,
    /// Peak volume threshold for visual indicator (0-100, percentage of reference level)
    #[serde(default = "default_peak_volume_threshold")]
    pub peak_volume_threshold: u8,
    /// Reference level in dBFS for 100% meter display (typical: -20 to -6 dBFS)
    #[serde(default = "default_reference_level_db")]
    pub reference_level_db: i8,
    /// Opus encoder options passed to ffmpeg (output is always WebM)
    #[serde(default = "default_opus_options")]
    pub opus_options: String,
}

fn default_peak_volume_threshold() -> u8 {
    90
}

fn default_reference_level_db() -> i8 {
    -20
}

fn default_opus_options() -> String {
    "-ab 24k".to_string()
}

/// Identity the created stories are attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildConfig {
    /// Child identifier sent with story-creation requests.
    /// Placeholder until the CLI is linked to a Storytime account.
    #[serde(default = "default_child_id")]
    pub id: String,
}

impl Default for ChildConfig {
    fn default() -> Self {
        Self {
            id: default_child_id(),
        }
    }
}

fn default_child_id() -> String {
    crate::identity::PLACEHOLDER_CHILD_ID.to_string()
}

/// Complete application configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct StorytimeConfig {
    pub api: ApiConfig,
    pub audio: AudioConfig,
    #[serde(default)]
    pub child: ChildConfig,
}

impl StorytimeConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = config_path()?;
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Path of the config file, creating the config directory on the way.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let config_dir = home.join(".config").join("storytime");
    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("storytime.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: StorytimeConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:8000"

            [audio]
            device = "default"
            sample_rate = 16000
            "#,
        )
        .unwrap();

        assert_eq!(config.api.web_base_url, "http://localhost:3000");
        assert_eq!(config.api.request_timeout_secs, 60);
        assert_eq!(config.audio.peak_volume_threshold, 90);
        assert_eq!(config.child.id, crate::identity::PLACEHOLDER_CHILD_ID);
    }

    #[test]
    fn test_request_timeout_conversion() {
        let api = ApiConfig {
            base_url: "http://localhost:8000".to_string(),
            web_base_url: default_web_base_url(),
            request_timeout_secs: 5,
        };
        assert_eq!(api.request_timeout(), Duration::from_secs(5));
    }
}
