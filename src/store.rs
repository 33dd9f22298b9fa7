//! Ticket store: the single source of truth for what the front end shows.
//!
//! The store sits between commands and a [`TicketBackend`]. Each operation
//! calls the backend and merges the result into the held state. Failures are
//! converted into one human-readable message kept in the error slot until
//! cleared or replaced; field validation failures are returned to the caller
//! without touching the slot.
//!
//! State lives behind a mutex that is never held across an await, so
//! operations may overlap. Overlapping [`TicketStore::load_tickets`] calls are
//! ordered by a request token: only the response to the most recent call is
//! applied.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::backend::{BackendMode, TicketBackend};
use crate::board::Board;
use crate::error::{DeskError, Result};
use crate::ticket::{
    Comment, NewComment, NewTicket, Ticket, TicketFilter, TicketStats, TransitionRequest,
};
use crate::types::TicketStatus;
use crate::validation::{validate_comment, validate_new_ticket};
use crate::workflow::{can_transition, check_transition};

/// Everything the front end renders from.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub tickets: Vec<Ticket>,
    pub selected: Option<Ticket>,
    pub filters: TicketFilter,
    pub loading: bool,
    pub error: Option<String>,
    pub stats: Option<TicketStats>,
}

/// Result of a list load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the held list; carries the ticket count
    Applied(usize),
    /// A newer load was started before this one finished; nothing changed
    Stale,
}

pub struct TicketStore {
    backend: Arc<dyn TicketBackend>,
    state: Mutex<StoreState>,
    latest_load: AtomicU64,
}

impl TicketStore {
    pub fn new(backend: Arc<dyn TicketBackend>) -> Self {
        Self {
            backend,
            state: Mutex::new(StoreState::default()),
            latest_load: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Replace the held list with the tickets matching `filter`.
    ///
    /// On failure the previously loaded tickets are kept.
    pub async fn load_tickets(&self, filter: TicketFilter) -> Result<LoadOutcome> {
        let token = self.latest_load.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock();
            state.filters = filter.clone();
            state.loading = true;
            state.error = None;
        }

        let result = self.backend.list_tickets(&filter).await;

        let mut state = self.state.lock();
        if self.latest_load.load(Ordering::SeqCst) != token {
            match result {
                Ok(_) => tracing::debug!(token, "discarding stale ticket list response"),
                Err(e) => tracing::debug!(token, %e, "discarding stale ticket list failure"),
            }
            return Ok(LoadOutcome::Stale);
        }

        state.loading = false;
        match result {
            Ok(tickets) => {
                let count = tickets.len();
                state.tickets = tickets;
                Ok(LoadOutcome::Applied(count))
            }
            Err(e) => {
                state.error = Some(e.banner_message(self.is_demo()));
                Err(e)
            }
        }
    }

    /// Reload the list with the active filters.
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        let filter = self.filters();
        self.load_tickets(filter).await
    }

    /// Fetch one ticket with its comments and make it the selection.
    ///
    /// On failure the selection is left as it was.
    pub async fn load_ticket(&self, id: u64) -> Result<Ticket> {
        self.begin();
        let result = async {
            let mut ticket = self.backend.get_ticket(id).await?;
            let comments = self.backend.list_comments(id).await?;
            ticket.comment_total = comments.len();
            ticket.comments = comments;
            Ok::<_, DeskError>(ticket)
        }
        .await;

        match result {
            Ok(ticket) => {
                let mut state = self.state.lock();
                state.selected = Some(ticket.clone());
                state.loading = false;
                Ok(ticket)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Validate and create a ticket, prepending it to the held list.
    pub async fn create_ticket(&self, fields: NewTicket) -> Result<Ticket> {
        let fields = validate_new_ticket(fields)?;

        self.begin();
        match self.backend.create_ticket(fields).await {
            Ok(ticket) => {
                let mut state = self.state.lock();
                state.tickets.insert(0, ticket.clone());
                state.loading = false;
                tracing::debug!(id = ticket.id, "ticket created");
                Ok(ticket)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Move a ticket to `status`, optionally attaching a comment.
    ///
    /// The move is checked against the workflow table before the backend is
    /// called; the backend checks it again. A held copy that rejects the move
    /// may be out of date, so the rejection is only final once confirmed
    /// against a freshly fetched ticket.
    pub async fn transition_ticket(
        &self,
        id: u64,
        status: TicketStatus,
        comment: Option<String>,
    ) -> Result<Ticket> {
        self.begin();

        let current = match self.held_status(id) {
            Some(held) if can_transition(held, status) => held,
            _ => match self.backend.get_ticket(id).await {
                Ok(ticket) => ticket.status,
                Err(e) => return Err(self.fail(e)),
            },
        };
        if let Err(e) = check_transition(current, status) {
            return Err(self.fail(e));
        }

        let request = TransitionRequest { status, comment };
        match self.backend.transition_ticket(id, request).await {
            Ok(ticket) => {
                let mut state = self.state.lock();
                if let Some(held) = state.tickets.iter_mut().find(|t| t.id == id) {
                    *held = ticket.clone();
                }
                if let Some(selected) = state.selected.as_mut()
                    && selected.id == id
                {
                    *selected = ticket.clone();
                }
                state.loading = false;
                tracing::debug!(id, from = %current, to = %status, "ticket transitioned");
                Ok(ticket)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Append a comment to a ticket.
    pub async fn add_comment(&self, ticket_id: u64, author: &str, content: &str) -> Result<Comment> {
        let comment = validate_comment(NewComment {
            author: author.to_string(),
            content: content.to_string(),
        })?;

        match self.backend.add_comment(ticket_id, comment).await {
            Ok(created) => {
                let mut state = self.state.lock();
                if let Some(selected) = state.selected.as_mut()
                    && selected.id == ticket_id
                {
                    selected.push_comment(created.clone());
                }
                if let Some(held) = state.tickets.iter_mut().find(|t| t.id == ticket_id) {
                    held.record_comment(created.clone());
                }
                Ok(created)
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    /// Fetch aggregate counts. Failures are logged and leave the error slot
    /// alone.
    pub async fn load_stats(&self) -> Result<TicketStats> {
        match self.backend.stats().await {
            Ok(stats) => {
                self.state.lock().stats = Some(stats.clone());
                Ok(stats)
            }
            Err(e) => {
                tracing::warn!("Failed to load ticket stats: {e}");
                Err(e)
            }
        }
    }

    pub fn set_filters(&self, filter: TicketFilter) {
        self.state.lock().filters = filter;
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    pub fn clear_selection(&self) {
        self.state.lock().selected = None;
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn tickets(&self) -> Vec<Ticket> {
        self.state.lock().tickets.clone()
    }

    pub fn selected(&self) -> Option<Ticket> {
        self.state.lock().selected.clone()
    }

    pub fn filters(&self) -> TicketFilter {
        self.state.lock().filters.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn stats(&self) -> Option<TicketStats> {
        self.state.lock().stats.clone()
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.lock().clone()
    }

    pub fn board(&self) -> Board {
        Board::from_tickets(&self.state.lock().tickets)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn is_demo(&self) -> bool {
        self.backend.mode() == BackendMode::Demo
    }

    fn begin(&self) {
        let mut state = self.state.lock();
        state.loading = true;
        state.error = None;
    }

    /// End an operation started with [`Self::begin`]: clear the loading flag,
    /// record `error` in the slot and hand it back to the caller.
    fn fail(&self, error: DeskError) -> DeskError {
        self.state.lock().loading = false;
        self.record_error(error)
    }

    /// Record `error` in the slot without touching the loading flag.
    fn record_error(&self, error: DeskError) -> DeskError {
        let message = error.banner_message(self.is_demo());
        tracing::debug!(%error, "store operation failed");
        self.state.lock().error = Some(message);
        error
    }

    fn held_status(&self, id: u64) -> Option<TicketStatus> {
        let state = self.state.lock();
        state
            .selected
            .as_ref()
            .filter(|t| t.id == id)
            .or_else(|| state.tickets.iter().find(|t| t.id == id))
            .map(|t| t.status)
    }
}
