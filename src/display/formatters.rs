//! Output formatters for ticket details, the kanban board and stats

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{
    format_comment_count, format_date_for_display, format_priority_colored,
    format_status_colored, format_timestamp, truncate,
};
use crate::board::Board;
use crate::ticket::{Ticket, TicketStats};

/// Width of a single board column, borders excluded
pub const BOARD_COLUMN_WIDTH: usize = 26;

/// Ticket detail formatter
pub struct TicketFormatter;

impl TicketFormatter {
    /// Full ticket view with metadata, description, comments and available
    /// transitions
    pub fn format_detail(ticket: &Ticket) -> String {
        let mut output = format!(
            "{} {}\n",
            format!("#{}", ticket.id).cyan().bold(),
            ticket.title.bold()
        );
        output.push_str(&format!(
            "{} {}\n\n",
            format_status_colored(ticket.status),
            format_priority_colored(ticket.priority)
        ));

        let requester = match &ticket.email {
            Some(email) => format!("{} <{}>", ticket.requester, email),
            None => ticket.requester.clone(),
        };
        output.push_str(&format!("{:<11}{}\n", "Requester:", requester));
        output.push_str(&format!(
            "{:<11}{}\n",
            "Created:",
            format_timestamp(ticket.created_at)
        ));
        output.push_str(&format!(
            "{:<11}{}\n",
            "Updated:",
            format_timestamp(ticket.updated_at)
        ));

        output.push_str(&format!("\n{}\n", ticket.description));

        output.push_str(&Self::format_comments(ticket));
        output.push_str(&Self::format_transitions(ticket));
        output
    }

    fn format_comments(ticket: &Ticket) -> String {
        let mut output = format!(
            "\n## Comments ({})\n",
            format_comment_count(ticket.comment_count())
        );
        if ticket.comments.is_empty() {
            output.push_str(&format!("{}\n", "No comments yet.".dimmed()));
            return output;
        }
        for comment in &ticket.comments {
            output.push_str(&format!(
                "- {} {}: {}\n",
                format_timestamp(comment.created_at).dimmed(),
                comment.author.bold(),
                comment.content
            ));
        }
        output
    }

    fn format_transitions(ticket: &Ticket) -> String {
        let transitions = ticket.valid_transitions();
        if transitions.is_empty() {
            return format!(
                "\n{}\n",
                "Closed tickets cannot change status.".dimmed()
            );
        }
        let moves: Vec<String> = transitions
            .iter()
            .map(|t| format!("{} ({})", t.label, t.status.as_str()))
            .collect();
        format!("\n{} {}\n", "Next:".bold(), moves.join(", "))
    }
}

/// Kanban board formatter
pub struct BoardFormatter;

impl BoardFormatter {
    /// Render the board as side-by-side text columns.
    pub fn format(board: &Board) -> String {
        let width = BOARD_COLUMN_WIDTH;
        let rule = vec!["-".repeat(width); board.columns.len()].join("+");

        let mut output = String::new();
        let headers: Vec<String> = board
            .columns
            .iter()
            .map(|c| pad(&format!("{} ({})", c.title, c.tickets.len()), width))
            .collect();
        output.push_str(&format!("{}\n", headers.join("|").bold()));
        output.push_str(&format!("{rule}\n"));

        for row in 0..board.depth() {
            let cells: Vec<String> = board
                .columns
                .iter()
                .map(|c| match c.tickets.get(row) {
                    Some(ticket) => Self::card(ticket, width),
                    None => " ".repeat(width),
                })
                .collect();
            output.push_str(&format!("{}\n", cells.join("|")));
        }

        if board.total() == 0 {
            output.push_str(&format!("{}\n", "No tickets found.".dimmed()));
        }
        output
    }

    fn card(ticket: &Ticket, width: usize) -> String {
        let id = format!("#{} ", ticket.id);
        let title = truncate(&ticket.title, width.saturating_sub(id.chars().count()));
        let cell = pad(&format!("{id}{title}"), width);
        // Color after padding so escape codes do not skew the column width
        match ticket.priority {
            crate::types::TicketPriority::High => cell.red().to_string(),
            _ => cell,
        }
    }
}

fn pad(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let fill = width.saturating_sub(text.chars().count());
    format!("{text}{}", " ".repeat(fill))
}

/// A row in the ticket list table
#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Requester")]
    requester: String,
    #[tabled(rename = "Comments")]
    comments: usize,
    #[tabled(rename = "Created")]
    created: String,
}

/// A row in the stats table
#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Group")]
    group: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Tickets")]
    count: usize,
}

/// Table formatters for list and stats output
pub struct TableFormatter;

impl TableFormatter {
    pub fn tickets(tickets: &[Ticket]) -> String {
        let rows: Vec<TicketRow> = tickets
            .iter()
            .map(|t| TicketRow {
                id: t.id,
                status: t.status.label(),
                priority: t.priority.label(),
                title: truncate(&t.title, 40),
                requester: t.requester.clone(),
                comments: t.comment_count(),
                created: format_date_for_display(t.created_at),
            })
            .collect();
        Table::new(rows).with(Style::rounded()).to_string()
    }

    pub fn stats(stats: &TicketStats) -> String {
        let mut rows: Vec<CountRow> = stats
            .by_status
            .iter()
            .map(|c| CountRow {
                group: "Status",
                value: c.label.clone(),
                count: c.count,
            })
            .collect();
        rows.extend(stats.by_priority.iter().map(|c| CountRow {
            group: "Priority",
            value: c.label.clone(),
            count: c.count,
        }));
        rows.push(CountRow {
            group: "Total",
            value: String::new(),
            count: stats.total,
        });
        Table::new(rows).with(Style::rounded()).to_string()
    }
}
