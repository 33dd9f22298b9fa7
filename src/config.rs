//! Top-level application configuration.
//!
//! Configuration is stored in `.desk/config.yaml` and includes:
//! - Which backend to use (the REST API or the in-memory demo set)
//! - The REST API base URL
//! - Whether plain comments refresh a ticket's last-update time (demo only)
//! - The default author name for comments
//!
//! `DESK_API_URL` and `DESK_DEMO` override the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::BackendMode;
use crate::backend::http::DEFAULT_API_URL;
use crate::error::{DeskError, Result};
use crate::types::DESK_DIR;

pub const DEFAULT_AUTHOR: &str = "User";

/// Keys accepted by `desk config get/set`
pub const CONFIG_KEYS: &[&str] = &["backend", "api_url", "author", "comment_refreshes_updated_at"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend selection (default: http)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendMode>,

    /// Base URL of the REST API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Whether adding a comment refreshes the ticket's `updated_at`
    #[serde(default)]
    pub comment_refreshes_updated_at: bool,

    /// Author recorded on comments when none is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(DESK_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure .desk directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Backend to use, with `DESK_DEMO` taking precedence over the file
    pub fn backend_mode(&self) -> BackendMode {
        if let Ok(flag) = env::var("DESK_DEMO")
            && is_truthy(&flag)
        {
            return BackendMode::Demo;
        }
        self.backend.unwrap_or_default()
    }

    /// API base URL from environment, config file, or the local default
    pub fn api_url(&self) -> String {
        if let Ok(url) = env::var("DESK_API_URL")
            && !url.trim().is_empty()
        {
            return url;
        }
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn author(&self) -> String {
        self.author
            .clone()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
    }

    /// Read a single key as it would be shown by `desk config get`
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "backend" => Ok(self.backend.unwrap_or_default().to_string()),
            "api_url" => Ok(self
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())),
            "author" => Ok(self.author()),
            "comment_refreshes_updated_at" => Ok(self.comment_refreshes_updated_at.to_string()),
            _ => Err(unknown_key(key)),
        }
    }

    /// Update a single key, validating the value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "backend" => self.backend = Some(value.parse()?),
            "api_url" => {
                let parsed = url::Url::parse(value.trim())
                    .map_err(|e| DeskError::Config(format!("invalid API URL '{value}': {e}")))?;
                self.api_url = Some(parsed.as_str().trim_end_matches('/').to_string());
            }
            "author" => {
                let author = value.trim();
                if author.is_empty() {
                    return Err(DeskError::Config("author cannot be empty".to_string()));
                }
                self.author = Some(author.to_string());
            }
            "comment_refreshes_updated_at" => {
                self.comment_refreshes_updated_at = parse_bool(value)?;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> DeskError {
    DeskError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(DeskError::Config(format!(
            "invalid boolean '{value}', expected true or false"
        ))),
    }
}
