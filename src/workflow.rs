//! Ticket status workflow.
//!
//! The allowed moves form a closed table: `new -> in_progress`,
//! `in_progress -> resolved | new`, `resolved -> closed`, and `closed` is
//! terminal. Both the store and the backends consult this table.

use serde::Serialize;

use crate::error::{DeskError, Result};
use crate::types::TicketStatus;

/// A legal target status paired with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub status: TicketStatus,
    pub label: &'static str,
}

impl Transition {
    const fn to(status: TicketStatus, label: &'static str) -> Self {
        Self { status, label }
    }
}

const FROM_NEW: &[Transition] = &[Transition::to(TicketStatus::InProgress, "In Progress")];

const FROM_IN_PROGRESS: &[Transition] = &[
    Transition::to(TicketStatus::Resolved, "Resolved"),
    Transition::to(TicketStatus::New, "New"),
];

const FROM_RESOLVED: &[Transition] = &[Transition::to(TicketStatus::Closed, "Closed")];

const FROM_CLOSED: &[Transition] = &[];

/// Statuses reachable from `status`, in table order.
pub fn valid_transitions(status: TicketStatus) -> &'static [Transition] {
    match status {
        TicketStatus::New => FROM_NEW,
        TicketStatus::InProgress => FROM_IN_PROGRESS,
        TicketStatus::Resolved => FROM_RESOLVED,
        TicketStatus::Closed => FROM_CLOSED,
    }
}

/// Same lookup keyed by an exact status name. Any other string, including
/// differently cased or padded names, has no transitions.
pub fn valid_transitions_named(name: &str) -> &'static [Transition] {
    TicketStatus::ALL
        .iter()
        .find(|s| s.as_str() == name)
        .map(|s| valid_transitions(*s))
        .unwrap_or(&[])
}

pub fn can_transition(from: TicketStatus, to: TicketStatus) -> bool {
    valid_transitions(from).iter().any(|t| t.status == to)
}

pub fn is_terminal(status: TicketStatus) -> bool {
    valid_transitions(status).is_empty()
}

pub fn check_transition(from: TicketStatus, to: TicketStatus) -> Result<()> {
    if can_transition(from, to) {
        return Ok(());
    }
    Err(DeskError::InvalidTransition {
        from,
        to,
        allowed: valid_transitions(from).iter().map(|t| t.status).collect(),
    })
}
