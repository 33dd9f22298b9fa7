//! Kanban board model: tickets grouped into one column per status.

use serde::Serialize;

use crate::ticket::Ticket;
use crate::types::TicketStatus;

/// The kanban columns in order
pub const COLUMNS: [TicketStatus; 4] = TicketStatus::ALL;

/// Column display names
pub const COLUMN_NAMES: [&str; 4] = ["NEW", "IN PROGRESS", "RESOLVED", "CLOSED"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub status: TicketStatus,
    pub title: &'static str,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
}

impl Board {
    /// Group tickets by status, keeping their relative order within a column.
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let columns = COLUMNS
            .iter()
            .zip(COLUMN_NAMES)
            .map(|(status, title)| BoardColumn {
                status: *status,
                title,
                tickets: tickets
                    .iter()
                    .filter(|t| t.status == *status)
                    .cloned()
                    .collect(),
            })
            .collect();
        Board { columns }
    }

    pub fn column(&self, status: TicketStatus) -> &BoardColumn {
        let idx = COLUMNS.iter().position(|s| *s == status).unwrap_or(0);
        &self.columns[idx]
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.tickets.len()).sum()
    }

    /// Length of the tallest column
    pub fn depth(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.tickets.len())
            .max()
            .unwrap_or(0)
    }
}
