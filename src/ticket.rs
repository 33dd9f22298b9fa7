//! Ticket and comment records plus the request shapes used to change them.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::types::{TicketPriority, TicketStatus};
use crate::workflow::{Transition, valid_transitions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author: String,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub requester: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Comment history in insertion order. Empty for list summaries.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Count reported by list endpoints that omit the comments themselves
    #[serde(default)]
    pub comment_total: usize,
}

impl Ticket {
    /// Number of comments, falling back to the reported total when the
    /// history itself was not loaded.
    pub fn comment_count(&self) -> usize {
        self.comments.len().max(self.comment_total)
    }

    pub fn valid_transitions(&self) -> &'static [Transition] {
        valid_transitions(self.status)
    }

    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.comment_total = self.comments.len();
    }

    /// Record a comment added elsewhere. Summaries without a loaded history
    /// only have their count bumped.
    pub fn record_comment(&mut self, comment: Comment) {
        if self.comments.len() >= self.comment_total {
            self.push_comment(comment);
        } else {
            self.comment_total += 1;
        }
    }

    /// Case-insensitive substring match over title, description and requester.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.title, &self.description, &self.requester]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Fields for a new ticket. Status, ids and timestamps are assigned by the
/// backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub requester: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub author: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TransitionRequest {
    pub fn new(status: TicketStatus) -> Self {
        Self {
            status,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// The optional comment, trimmed, or `None` when blank.
    pub fn user_comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Active list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl TicketFilter {
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Search text with surrounding whitespace removed, `None` when blank.
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(status) = self.status
            && ticket.status != status
        {
            return false;
        }
        match self.search_text() {
            Some(needle) => ticket.matches_search(needle),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: TicketStatus,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCount {
    pub priority: TicketPriority,
    pub label: String,
    pub count: usize,
}

/// Aggregate counts by status and by priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
    pub total: usize,
    pub by_status: Vec<StatusCount>,
    pub by_priority: Vec<PriorityCount>,
}

impl TicketStats {
    pub fn from_tickets<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Self {
        let mut status_counts = [0usize; 4];
        let mut priority_counts = [0usize; 3];
        let mut total = 0;
        for ticket in tickets {
            total += 1;
            if let Some(i) = TicketStatus::ALL.iter().position(|s| *s == ticket.status) {
                status_counts[i] += 1;
            }
            if let Some(i) = TicketPriority::ALL.iter().position(|p| *p == ticket.priority) {
                priority_counts[i] += 1;
            }
        }

        TicketStats {
            total,
            by_status: TicketStatus::ALL
                .iter()
                .zip(status_counts)
                .map(|(status, count)| StatusCount {
                    status: *status,
                    label: status.label().to_string(),
                    count,
                })
                .collect(),
            by_priority: TicketPriority::ALL
                .iter()
                .zip(priority_counts)
                .map(|(priority, count)| PriorityCount {
                    priority: *priority,
                    label: priority.label().to_string(),
                    count,
                })
                .collect(),
        }
    }

    pub fn status_count(&self, status: TicketStatus) -> usize {
        self.by_status
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn priority_count(&self, priority: TicketPriority) -> usize {
        self.by_priority
            .iter()
            .find(|c| c.priority == priority)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: u64, status: TicketStatus, title: &str, requester: &str) -> Ticket {
        Ticket {
            id,
            title: title.to_string(),
            description: "Something is broken somewhere".to_string(),
            priority: TicketPriority::Medium,
            status,
            requester: requester.to_string(),
            email: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            comments: Vec::new(),
            comment_total: 0,
        }
    }

    #[test]
    fn test_search_is_case_insensitive_over_requester() {
        let t = ticket(1, TicketStatus::New, "Login fails", "María García");
        assert!(t.matches_search("garcía"));
        assert!(t.matches_search("GARCÍA"));
        assert!(t.matches_search("login"));
        assert!(t.matches_search("broken"));
        assert!(!t.matches_search("printer"));
    }

    #[test]
    fn test_filter_status_is_exact() {
        let filter = TicketFilter::default().with_status(TicketStatus::Resolved);
        assert!(filter.matches(&ticket(1, TicketStatus::Resolved, "A ticket", "Ann")));
        assert!(!filter.matches(&ticket(2, TicketStatus::Closed, "A ticket", "Ann")));
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let filter = TicketFilter::default().with_search("   ");
        assert_eq!(filter.search_text(), None);
        assert!(filter.matches(&ticket(1, TicketStatus::New, "A ticket", "Ann")));
    }

    #[test]
    fn test_comment_count_uses_reported_total() {
        let mut t = ticket(1, TicketStatus::New, "A ticket", "Ann");
        t.comment_total = 3;
        assert_eq!(t.comment_count(), 3);
        t.comment_total = 0;
        t.push_comment(Comment {
            id: 1,
            author: "Ann".to_string(),
            content: "hello".to_string(),
            created_at: Timestamp::UNIX_EPOCH,
        });
        assert_eq!(t.comment_count(), 1);
    }

    #[test]
    fn test_stats_counts() {
        let mut high = ticket(3, TicketStatus::Closed, "C ticket", "Cy");
        high.priority = TicketPriority::High;
        let tickets = vec![
            ticket(1, TicketStatus::New, "A ticket", "Ann"),
            ticket(2, TicketStatus::New, "B ticket", "Bo"),
            high,
        ];
        let stats = TicketStats::from_tickets(&tickets);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.status_count(TicketStatus::New), 2);
        assert_eq!(stats.status_count(TicketStatus::Resolved), 0);
        assert_eq!(stats.priority_count(TicketPriority::Medium), 2);
        assert_eq!(stats.priority_count(TicketPriority::High), 1);
        assert_eq!(stats.by_status[1].label, "In Progress");
    }
}
