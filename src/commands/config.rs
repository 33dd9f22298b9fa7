//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print a single value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions};
use crate::config::{CONFIG_KEYS, Config};
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    let json_output = json!({
        "backend": config.backend_mode().to_string(),
        "api_url": config.api_url(),
        "author": config.author(),
        "comment_refreshes_updated_at": config.comment_refreshes_updated_at,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = format!("{}\n\n", "Configuration:".cyan().bold());
    text_output.push_str(&format!(
        "{}: {}\n",
        "backend".cyan(),
        config.backend_mode()
    ));
    text_output.push_str(&format!("{}: {}\n", "api_url".cyan(), config.api_url()));
    text_output.push_str(&format!("{}: {}\n", "author".cyan(), config.author()));
    text_output.push_str(&format!(
        "{}: {}\n",
        "comment_refreshes_updated_at".cyan(),
        config.comment_refreshes_updated_at
    ));
    text_output.push_str(&format!(
        "\n{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output.json)
}

/// Print a single configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;

    CommandOutput::new(json!({ "key": key, "value": value }))
        .with_text(value)
        .print(output.json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key)?;
    tracing::debug!(key, value = %stored, "config updated");

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": stored,
        "valid_keys": CONFIG_KEYS,
    }))
    .with_text(format!("Set {} = {}", key.cyan(), stored))
    .print(output.json)
}
