use serde_json::json;

use super::{CommandOutput, OutputOptions, open_store};
use crate::display::TicketFormatter;
use crate::error::Result;

/// Display a ticket with its comment history and next moves
pub async fn cmd_show(id: u64, output: OutputOptions) -> Result<()> {
    let store = open_store(output)?;
    let ticket = store.load_ticket(id).await?;

    CommandOutput::new(json!({
        "ticket": ticket,
        "valid_transitions": ticket.valid_transitions(),
    }))
    .with_text(TicketFormatter::format_detail(&ticket))
    .print(output.json)
}
