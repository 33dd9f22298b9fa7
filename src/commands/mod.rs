//! CLI command implementations.
//!
//! Every command that touches tickets builds a [`TicketStore`] over the
//! configured backend, runs one or two store operations and prints either
//! human-readable text or JSON.

mod board;
mod comment;
mod config;
mod create;
mod ls;
mod show;
mod stats;
mod transition;

pub use board::cmd_board;
pub use comment::cmd_comment;
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use create::{CreateOptions, cmd_create};
pub use ls::cmd_ls;
pub use show::cmd_show;
pub use stats::cmd_stats;
pub use transition::cmd_transition;

use owo_colors::OwoColorize;
use serde_json::Value;

use crate::backend::{self, BackendMode};
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::store::TicketStore;
use crate::ticket::TicketFilter;
use crate::types::TicketStatus;

/// Flags shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Print JSON instead of text
    pub json: bool,
    /// Force the in-memory demo backend
    pub demo: bool,
}

/// Filters accepted by `board` and `ls`
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub status: Option<TicketStatus>,
    pub search: Option<String>,
}

impl ListOptions {
    pub fn to_filter(&self) -> TicketFilter {
        TicketFilter {
            status: self.status,
            search: self.search.clone(),
        }
    }
}

/// Output of a command in both renderings.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output_json: bool) -> Result<()> {
        if output_json {
            print_json(&self.json)
        } else {
            if let Some(text) = self.text {
                println!("{text}");
            }
            Ok(())
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load the config, applying the `--demo` override.
pub fn load_config(output: OutputOptions) -> Result<Config> {
    let mut config = Config::load()?;
    if output.demo {
        config.backend = Some(BackendMode::Demo);
    }
    Ok(config)
}

/// Build a store over the configured backend.
pub fn open_store(output: OutputOptions) -> Result<TicketStore> {
    let config = load_config(output)?;
    let backend = backend::from_config(&config)?;
    tracing::debug!(mode = %backend.mode(), "opened ticket store");
    Ok(TicketStore::new(backend))
}

/// Whether errors should be reported in demo form.
pub fn demo_enabled(output: OutputOptions) -> bool {
    output.demo
        || Config::load()
            .map(|c| c.backend_mode() == BackendMode::Demo)
            .unwrap_or(false)
}

/// Print an error to stderr the way the front end shows it: one line per
/// failing field for validation errors, a single banner otherwise.
pub fn report_error(err: &DeskError, demo: bool) {
    match err {
        DeskError::Validation(errors) => {
            eprintln!("{}", "Please fix the following fields:".red());
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field.bold(), message);
            }
        }
        DeskError::Config(_)
        | DeskError::InvalidStatus(_)
        | DeskError::InvalidPriority(_)
        | DeskError::Io(_)
        | DeskError::YamlParse(_) => eprintln!("{}", err.to_string().red()),
        _ => eprintln!("{}", err.banner_message(demo).red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_to_filter() {
        let opts = ListOptions {
            status: Some(TicketStatus::New),
            search: Some("vpn".to_string()),
        };
        let filter = opts.to_filter();
        assert_eq!(filter.status, Some(TicketStatus::New));
        assert_eq!(filter.search_text(), Some("vpn"));
    }

    #[test]
    fn test_command_output_json() {
        let out = CommandOutput::new(serde_json::json!({"id": 1})).with_text("done");
        assert!(out.print(true).is_ok());
    }
}
