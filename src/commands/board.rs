//! Kanban board command (`desk board`)

use serde_json::json;

use super::{CommandOutput, ListOptions, OutputOptions, open_store};
use crate::display::BoardFormatter;
use crate::error::Result;

/// Print tickets grouped into one column per status
pub async fn cmd_board(list: ListOptions, output: OutputOptions) -> Result<()> {
    let store = open_store(output)?;
    store.load_tickets(list.to_filter()).await?;
    let board = store.board();

    CommandOutput::new(json!({
        "mode": store.mode().to_string(),
        "filters": store.filters(),
        "total": board.total(),
        "columns": board.columns,
    }))
    .with_text(BoardFormatter::format(&board))
    .print(output.json)
}
