use jiff::Timestamp;
use jiff::tz::TimeZone;
use owo_colors::OwoColorize;

use crate::ticket::Ticket;
use crate::types::{TicketPriority, TicketStatus};

pub mod formatters;

pub use formatters::*;

pub fn format_status_colored(status: TicketStatus) -> String {
    format_status_colored_with_format(status, |s| format!("[{}]", s))
}

pub fn format_status_colored_with_format<F>(status: TicketStatus, format_fn: F) -> String
where
    F: Fn(&str) -> String,
{
    let badge = format_fn(status.label());
    match status {
        TicketStatus::New => badge.blue().to_string(),
        TicketStatus::InProgress => badge.yellow().to_string(),
        TicketStatus::Resolved => badge.green().to_string(),
        TicketStatus::Closed => badge.dimmed().to_string(),
    }
}

pub fn format_priority_colored(priority: TicketPriority) -> String {
    let badge = format!("[{}]", priority.label());
    match priority {
        TicketPriority::High => badge.red().to_string(),
        TicketPriority::Medium => badge.yellow().to_string(),
        TicketPriority::Low => badge.green().to_string(),
    }
}

/// Format a ticket for single-line display with colors
pub fn format_ticket_line(ticket: &Ticket) -> String {
    let id = format!("#{:<4}", ticket.id);
    format!(
        "{} {}{} {} ({}, {})",
        id.cyan(),
        format_status_colored(ticket.status),
        format_priority_colored(ticket.priority),
        ticket.title,
        ticket.requester,
        format_comment_count(ticket.comment_count()),
    )
}

pub fn format_comment_count(count: usize) -> String {
    match count {
        1 => "1 comment".to_string(),
        n => format!("{n} comments"),
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM` in UTC
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC)
        .strftime("%Y-%m-%d %H:%M")
        .to_string()
}

/// Format a timestamp as just its date part
pub fn format_date_for_display(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC).strftime("%Y-%m-%d").to_string()
}

/// Shorten `text` to at most `width` characters, marking the cut with `…`
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let kept: String = text.chars().take(width - 1).collect();
    format!("{kept}…")
}
