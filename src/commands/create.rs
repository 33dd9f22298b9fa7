use serde_json::json;

use super::{CommandOutput, OutputOptions, open_store};
use crate::display::format_ticket_line;
use crate::error::Result;
use crate::ticket::NewTicket;
use crate::types::TicketPriority;

/// Options for creating a new ticket
pub struct CreateOptions {
    pub title: String,
    pub description: String,
    pub requester: String,
    pub priority: TicketPriority,
    pub email: Option<String>,
}

/// Create a new ticket
pub async fn cmd_create(options: CreateOptions, output: OutputOptions) -> Result<()> {
    let store = open_store(output)?;
    let ticket = store
        .create_ticket(NewTicket {
            title: options.title,
            description: options.description,
            priority: options.priority,
            requester: options.requester,
            email: options.email,
        })
        .await?;

    CommandOutput::new(json!({
        "id": ticket.id,
        "action": "created",
        "ticket": ticket,
    }))
    .with_text(format!("Created {}", format_ticket_line(&ticket)))
    .print(output.json)
}
