//! Data access layer.
//!
//! Every ticket operation goes through [`TicketBackend`]. Two implementations
//! exist: [`HttpBackend`] talks to the REST API and [`MemoryBackend`] serves
//! the seeded demo data set from memory. Both apply the same filter semantics
//! and both reject transitions the workflow table does not allow.

pub mod http;
pub mod memory;
mod wire;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::ticket::{Comment, NewComment, NewTicket, Ticket, TicketFilter, TicketStats, TransitionRequest};

pub use http::HttpBackend;
pub use memory::{MemoryBackend, MemoryOptions};

/// Which data source a backend serves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Http,
    Demo,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Http => write!(f, "http"),
            BackendMode::Demo => write!(f, "demo"),
        }
    }
}

impl std::str::FromStr for BackendMode {
    type Err = crate::error::DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(BackendMode::Http),
            "demo" => Ok(BackendMode::Demo),
            _ => Err(crate::error::DeskError::Config(format!(
                "unknown backend '{s}', expected 'http' or 'demo'"
            ))),
        }
    }
}

/// Common interface for ticket data sources
#[async_trait]
pub trait TicketBackend: Send + Sync {
    fn mode(&self) -> BackendMode;

    /// Tickets matching `filter`, newest first
    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;

    /// A single ticket including its comment history
    async fn get_ticket(&self, id: u64) -> Result<Ticket>;

    async fn create_ticket(&self, fields: NewTicket) -> Result<Ticket>;

    /// Move a ticket to a new status, returning the updated ticket
    async fn transition_ticket(&self, id: u64, request: TransitionRequest) -> Result<Ticket>;

    async fn list_comments(&self, ticket_id: u64) -> Result<Vec<Comment>>;

    async fn add_comment(&self, ticket_id: u64, comment: NewComment) -> Result<Comment>;

    async fn stats(&self) -> Result<TicketStats>;
}

/// Build the backend selected by `config`.
pub fn from_config(config: &Config) -> Result<Arc<dyn TicketBackend>> {
    match config.backend_mode() {
        BackendMode::Demo => Ok(Arc::new(MemoryBackend::seeded_with(MemoryOptions {
            comment_refreshes_updated_at: config.comment_refreshes_updated_at,
        }))),
        BackendMode::Http => Ok(Arc::new(HttpBackend::new(&config.api_url())?)),
    }
}
