//! In-memory ticket repository used in demo mode.
//!
//! Each [`MemoryBackend`] owns its own data; [`MemoryBackend::seeded`] hands
//! out a fresh copy of the demo tickets every time, so separate instances
//! never observe each other's writes.

use async_trait::async_trait;
use jiff::Timestamp;
use parking_lot::Mutex;

use super::{BackendMode, TicketBackend};
use crate::error::{DeskError, Result};
use crate::ticket::{
    Comment, NewComment, NewTicket, Ticket, TicketFilter, TicketStats, TransitionRequest,
};
use crate::types::{SYSTEM_AUTHOR, TicketPriority, TicketStatus};
use crate::validation::{validate_comment, validate_new_ticket};
use crate::workflow::check_transition;

/// Behaviour switches for the in-memory repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryOptions {
    /// Whether a plain comment (outside a transition) bumps `updated_at`
    pub comment_refreshes_updated_at: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    tickets: Vec<Ticket>,
    next_ticket_id: u64,
    next_comment_id: u64,
}

impl MemoryState {
    fn from_tickets(tickets: Vec<Ticket>) -> Self {
        let next_ticket_id = tickets.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let next_comment_id = tickets
            .iter()
            .flat_map(|t| t.comments.iter().map(|c| c.id))
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            tickets,
            next_ticket_id,
            next_comment_id,
        }
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut Ticket> {
        self.tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DeskError::TicketNotFound(id))
    }

    fn comment(&mut self, author: &str, content: String, at: Timestamp) -> Comment {
        let id = self.next_comment_id;
        self.next_comment_id += 1;
        Comment {
            id,
            author: author.to_string(),
            content,
            created_at: at,
        }
    }
}

pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    options: MemoryOptions,
}

impl MemoryBackend {
    pub fn empty() -> Self {
        Self::with_tickets(Vec::new(), MemoryOptions::default())
    }

    /// A fresh copy of the demo data set.
    pub fn seeded() -> Self {
        Self::seeded_with(MemoryOptions::default())
    }

    pub fn seeded_with(options: MemoryOptions) -> Self {
        Self::with_tickets(demo_tickets(), options)
    }

    pub fn with_tickets(tickets: Vec<Ticket>, options: MemoryOptions) -> Self {
        Self {
            state: Mutex::new(MemoryState::from_tickets(tickets)),
            options,
        }
    }

    pub fn options(&self) -> MemoryOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.state.lock().tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl TicketBackend for MemoryBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Demo
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let state = self.state.lock();
        let mut tickets: Vec<Ticket> = state
            .tickets
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tracing::debug!(count = tickets.len(), ?filter, "listed demo tickets");
        Ok(tickets)
    }

    async fn get_ticket(&self, id: u64) -> Result<Ticket> {
        self.state
            .lock()
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(DeskError::TicketNotFound(id))
    }

    async fn create_ticket(&self, fields: NewTicket) -> Result<Ticket> {
        let fields = validate_new_ticket(fields)?;
        let now = Timestamp::now();

        let mut state = self.state.lock();
        let id = state.next_ticket_id;
        state.next_ticket_id += 1;

        let created = state.comment(
            SYSTEM_AUTHOR,
            format!("Ticket created by {}", fields.requester),
            now,
        );
        let ticket = Ticket {
            id,
            title: fields.title,
            description: fields.description,
            priority: fields.priority,
            status: TicketStatus::New,
            requester: fields.requester,
            email: fields.email,
            created_at: now,
            updated_at: now,
            comments: vec![created],
            comment_total: 1,
        };
        state.tickets.insert(0, ticket.clone());

        tracing::debug!(id, "created demo ticket");
        Ok(ticket)
    }

    async fn transition_ticket(&self, id: u64, request: TransitionRequest) -> Result<Ticket> {
        let now = Timestamp::now();
        let mut state = self.state.lock();

        let current = state.find_mut(id)?.status;
        check_transition(current, request.status)?;

        let mut added = vec![state.comment(
            SYSTEM_AUTHOR,
            format!("Status changed to '{}'", request.status.label()),
            now,
        )];
        if let Some(text) = request.user_comment() {
            added.push(state.comment(SYSTEM_AUTHOR, text.to_string(), now));
        }

        let ticket = state.find_mut(id)?;
        ticket.status = request.status;
        ticket.updated_at = now;
        for comment in added {
            ticket.push_comment(comment);
        }

        tracing::debug!(id, from = %current, to = %request.status, "transitioned demo ticket");
        Ok(ticket.clone())
    }

    async fn list_comments(&self, ticket_id: u64) -> Result<Vec<Comment>> {
        Ok(self.get_ticket(ticket_id).await?.comments)
    }

    async fn add_comment(&self, ticket_id: u64, comment: NewComment) -> Result<Comment> {
        let comment = validate_comment(comment)?;
        let now = Timestamp::now();
        let refresh = self.options.comment_refreshes_updated_at;

        let mut state = self.state.lock();
        state.find_mut(ticket_id)?;
        let created = state.comment(&comment.author, comment.content, now);

        let ticket = state.find_mut(ticket_id)?;
        ticket.push_comment(created.clone());
        if refresh {
            ticket.updated_at = now;
        }
        Ok(created)
    }

    async fn stats(&self) -> Result<TicketStats> {
        Ok(TicketStats::from_tickets(&self.state.lock().tickets))
    }
}

// ============================================================================
// Demo data
// ============================================================================

/// 2024-08-01T00:00:00Z
const AUGUST_2024: i64 = 1_722_470_400;

fn august(day: i64, hour: i64, minute: i64) -> Timestamp {
    Timestamp::from_second(AUGUST_2024 + (day - 1) * 86_400 + hour * 3_600 + minute * 60)
        .unwrap_or(Timestamp::UNIX_EPOCH)
}

struct Seed {
    id: u64,
    title: &'static str,
    description: &'static str,
    priority: TicketPriority,
    status: TicketStatus,
    requester: &'static str,
    email: Option<&'static str>,
    created_at: Timestamp,
    updated_at: Timestamp,
    comments: Vec<(u64, &'static str, &'static str, Timestamp)>,
}

impl Seed {
    fn into_ticket(self) -> Ticket {
        let comments: Vec<Comment> = self
            .comments
            .into_iter()
            .map(|(id, author, content, created_at)| Comment {
                id,
                author: author.to_string(),
                content: content.to_string(),
                created_at,
            })
            .collect();
        Ticket {
            id: self.id,
            title: self.title.to_string(),
            description: self.description.to_string(),
            priority: self.priority,
            status: self.status,
            requester: self.requester.to_string(),
            email: self.email.map(str::to_string),
            created_at: self.created_at,
            updated_at: self.updated_at,
            comment_total: comments.len(),
            comments,
        }
    }
}

fn demo_tickets() -> Vec<Ticket> {
    let seeds = vec![
        Seed {
            id: 1,
            title: "Login error in the system",
            description: "Users cannot sign in with their usual credentials. The error appears after clicking 'Sign in'.",
            priority: TicketPriority::High,
            status: TicketStatus::InProgress,
            requester: "María García",
            email: Some("maria.garcia@empresa.com"),
            created_at: august(15, 9, 30),
            updated_at: august(15, 11, 45),
            comments: vec![
                (1, SYSTEM_AUTHOR, "Ticket created by María García", august(15, 9, 30)),
                (
                    2,
                    "Technical Support",
                    "We identified the problem. It looks like a fault in the authentication server. Working on a fix.",
                    august(15, 10, 15),
                ),
                (3, SYSTEM_AUTHOR, "Status changed to 'In Progress'", august(15, 11, 45)),
            ],
        },
        Seed {
            id: 2,
            title: "Access request for shared folder",
            description: "I need access to the shared folder 'Projects 2024' to collaborate on the current project.",
            priority: TicketPriority::Medium,
            status: TicketStatus::New,
            requester: "Carlos Rodríguez",
            email: Some("carlos.rodriguez@empresa.com"),
            created_at: august(16, 14, 20),
            updated_at: august(16, 14, 20),
            comments: vec![(
                4,
                SYSTEM_AUTHOR,
                "Ticket created by Carlos Rodríguez",
                august(16, 14, 20),
            )],
        },
        Seed {
            id: 3,
            title: "New workstation setup",
            description: "I need help setting up my new workstation with all the required programs and access.",
            priority: TicketPriority::Medium,
            status: TicketStatus::Resolved,
            requester: "Ana López",
            email: Some("ana.lopez@empresa.com"),
            created_at: august(10, 8, 15),
            updated_at: august(14, 16, 30),
            comments: vec![
                (5, SYSTEM_AUTHOR, "Ticket created by Ana López", august(10, 8, 15)),
                (
                    6,
                    "IT Support",
                    "Workstation configured. All required programs were installed and access was granted.",
                    august(14, 15, 20),
                ),
                (7, SYSTEM_AUTHOR, "Status changed to 'Resolved'", august(14, 16, 30)),
            ],
        },
        Seed {
            id: 4,
            title: "Office printer not working",
            description: "The second floor printer does not work. It keeps showing a connection error.",
            priority: TicketPriority::Low,
            status: TicketStatus::Closed,
            requester: "Luis Hernández",
            email: None,
            created_at: august(5, 13, 45),
            updated_at: august(12, 10, 20),
            comments: vec![
                (8, SYSTEM_AUTHOR, "Ticket created by Luis Hernández", august(5, 13, 45)),
                (
                    9,
                    "Maintenance",
                    "The printer network cable was replaced. Problem solved.",
                    august(12, 9, 30),
                ),
                (10, SYSTEM_AUTHOR, "Status changed to 'Closed'", august(12, 10, 20)),
            ],
        },
        Seed {
            id: 5,
            title: "Accounting software update",
            description: "The accounting system must be updated to the latest version to comply with new regulations.",
            priority: TicketPriority::High,
            status: TicketStatus::New,
            requester: "Patricia Morales",
            email: Some("patricia.morales@empresa.com"),
            created_at: august(17, 11, 0),
            updated_at: august(17, 11, 0),
            comments: vec![(
                11,
                SYSTEM_AUTHOR,
                "Ticket created by Patricia Morales",
                august(17, 11, 0),
            )],
        },
        Seed {
            id: 6,
            title: "Training on digital tools",
            description: "Requesting training on the new digital tools the company rolled out to improve productivity.",
            priority: TicketPriority::Low,
            status: TicketStatus::InProgress,
            requester: "Roberto Silva",
            email: Some("roberto.silva@empresa.com"),
            created_at: august(12, 16, 30),
            updated_at: august(15, 9, 15),
            comments: vec![
                (12, SYSTEM_AUTHOR, "Ticket created by Roberto Silva", august(12, 16, 30)),
                (
                    13,
                    "Human Resources",
                    "Training is scheduled for next Friday. An invitation will be sent by email.",
                    august(15, 9, 15),
                ),
            ],
        },
    ];

    seeds.into_iter().map(Seed::into_ticket).collect()
}
