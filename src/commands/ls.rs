use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, ListOptions, OutputOptions, open_store};
use crate::display::TableFormatter;
use crate::error::Result;

/// List tickets, newest first
pub async fn cmd_ls(list: ListOptions, output: OutputOptions) -> Result<()> {
    let store = open_store(output)?;
    store.load_tickets(list.to_filter()).await?;
    let tickets = store.tickets();

    let text = if tickets.is_empty() {
        "No tickets found.".dimmed().to_string()
    } else {
        TableFormatter::tickets(&tickets)
    };

    CommandOutput::new(json!(tickets)).with_text(text).print(output.json)
}
