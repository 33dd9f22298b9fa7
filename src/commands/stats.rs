use serde_json::json;

use super::{CommandOutput, OutputOptions, open_store};
use crate::display::TableFormatter;
use crate::error::Result;

/// Print ticket counts by status and priority
pub async fn cmd_stats(output: OutputOptions) -> Result<()> {
    let store = open_store(output)?;
    let stats = store.load_stats().await?;

    CommandOutput::new(json!(stats))
        .with_text(TableFormatter::stats(&stats))
        .print(output.json)
}
