use serde_json::json;

use super::{CommandOutput, OutputOptions, open_store};
use crate::error::Result;
use crate::types::TicketStatus;

/// Move a ticket to a new status
pub async fn cmd_transition(
    id: u64,
    status: TicketStatus,
    comment: Option<String>,
    output: OutputOptions,
) -> Result<()> {
    let store = open_store(output)?;
    let previous = store.load_ticket(id).await?;
    let ticket = store.transition_ticket(id, status, comment).await?;

    CommandOutput::new(json!({
        "id": ticket.id,
        "action": "status_changed",
        "previous_status": previous.status,
        "new_status": ticket.status,
        "comment_count": ticket.comment_count(),
        "valid_transitions": ticket.valid_transitions(),
    }))
    .with_text(format!(
        "Updated #{}: {} -> {}",
        ticket.id,
        previous.status.label(),
        ticket.status.label()
    ))
    .print(output.json)
}
