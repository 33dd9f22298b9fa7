use serde_json::json;

use super::{CommandOutput, OutputOptions, load_config, open_store};
use crate::error::Result;

/// Add a comment to a ticket
pub async fn cmd_comment(
    id: u64,
    content: &str,
    author: Option<&str>,
    output: OutputOptions,
) -> Result<()> {
    let author = match author {
        Some(author) => author.to_string(),
        None => load_config(output)?.author(),
    };

    let store = open_store(output)?;
    let comment = store.add_comment(id, &author, content).await?;

    CommandOutput::new(json!({
        "ticket_id": id,
        "action": "comment_added",
        "comment": comment,
    }))
    .with_text(format!("Comment added to #{id} by {}", comment.author))
    .print(output.json)
}
