// src/settings.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::{ChatError, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TOKEN_ENV: &str = "TOPIC_CHAT_TOKEN";

/// Overrides `api.baseUrl` when set.
pub const API_URL_ENV: &str = "TOPIC_CHAT_API_URL";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    pub base_url: String,
    /// Name of the environment variable the session store writes the bearer token to.
    pub token_env: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub reference_preview_limit: usize,
    pub title_max_chars: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            reference_preview_limit: 3,
            title_max_chars: 25,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub version: u32,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            api: ApiSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl AppSettings {
    /// Apply environment overrides on top of the file contents.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        self
    }
}

/// Get the path to the settings file (~/.config/topicChat/settings.json)
pub fn get_settings_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ChatError::Settings("Could not determine config directory".to_string()))?;

    let app_config_dir = config_dir.join("topicChat");

    if !app_config_dir.exists() {
        fs::create_dir_all(&app_config_dir)?;
    }

    Ok(app_config_dir.join("settings.json"))
}

/// Load settings from disk, creating default if not exists
pub fn load_settings() -> Result<AppSettings> {
    let path = get_settings_path()?;

    if !path.exists() {
        let default_settings = AppSettings::default();
        save_settings(&default_settings)?;
        info!(path = %path.display(), "created default settings");
        return Ok(default_settings);
    }

    let settings = parse_settings(&fs::read_to_string(&path)?)?;
    info!(path = %path.display(), "loaded settings");
    Ok(settings)
}

pub fn parse_settings(content: &str) -> Result<AppSettings> {
    serde_json::from_str(content)
        .map_err(|e| ChatError::Settings(format!("Failed to parse settings: {}", e)))
}

/// Save settings to disk
pub fn save_settings(settings: &AppSettings) -> Result<()> {
    let path = get_settings_path()?;

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| ChatError::Settings(format!("Failed to serialize settings: {}", e)))?;

    fs::write(&path, content)?;

    info!(path = %path.display(), "saved settings");
    Ok(())
}

/// Get default settings (for reset functionality)
pub fn get_default_settings() -> AppSettings {
    AppSettings::default()
}
