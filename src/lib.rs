pub mod backend;
pub mod board;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod store;
pub mod ticket;
pub mod types;
pub mod validation;
pub mod workflow;

pub use backend::{BackendMode, HttpBackend, MemoryBackend, MemoryOptions, TicketBackend};
pub use board::{Board, BoardColumn};
pub use config::Config;
pub use error::{DeskError, FieldErrors, Result};
pub use store::{LoadOutcome, StoreState, TicketStore};
pub use ticket::{
    Comment, NewComment, NewTicket, Ticket, TicketFilter, TicketStats, TransitionRequest,
};
pub use types::{TicketPriority, TicketStatus, VALID_PRIORITIES, VALID_STATUSES};
pub use workflow::{Transition, can_transition, valid_transitions};
