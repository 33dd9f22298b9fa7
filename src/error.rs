use std::fmt;

use thiserror::Error;

use crate::types::TicketStatus;

/// Field-level validation failures collected before any request is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message for a single field, if that field failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Turn the collected errors into a `Result`, failing if any were pushed.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DeskError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("cannot move ticket from '{}' to '{}'; valid transitions: {}", from.label(), to.label(), format_allowed(allowed))]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
        allowed: Vec<TicketStatus>,
    },

    #[error("ticket #{0} not found")]
    TicketNotFound(u64),

    #[error("request failed with status {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Request {
        status: u16,
        message: Option<String>,
    },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_allowed(allowed: &[TicketStatus]) -> String {
    if allowed.is_empty() {
        return "none".to_string();
    }
    allowed
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DeskError {
    /// Whether this error came from client-side field checks.
    pub fn is_validation(&self) -> bool {
        matches!(self, DeskError::Validation(_))
    }

    /// Normalize into the message shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            DeskError::Validation(errors) => errors.to_string(),
            DeskError::InvalidTransition { .. } => self.to_string(),
            DeskError::TicketNotFound(_) => "Resource not found.".to_string(),
            DeskError::Request { status, message } => match status {
                400 => message
                    .clone()
                    .unwrap_or_else(|| "Invalid data. Please review the fields.".to_string()),
                404 => "Resource not found.".to_string(),
                500 => "Internal server error. Please try again.".to_string(),
                _ => message.clone().unwrap_or_else(|| "Server error.".to_string()),
            },
            DeskError::Connection(_) => {
                "Could not connect to the server. Check your connection.".to_string()
            }
            _ => "Unexpected error. Please try again.".to_string(),
        }
    }

    /// Banner message for the given backend mode. Demo mode reports the raw
    /// error since there is no server response to interpret.
    pub fn banner_message(&self, demo: bool) -> String {
        if demo {
            format!("Demo mode error: {self}")
        } else {
            self.user_message()
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        let bad = DeskError::Request {
            status: 400,
            message: Some("titulo: too short".to_string()),
        };
        assert_eq!(bad.user_message(), "titulo: too short");

        let bad_no_payload = DeskError::Request {
            status: 400,
            message: None,
        };
        assert_eq!(
            bad_no_payload.user_message(),
            "Invalid data. Please review the fields."
        );

        let missing = DeskError::Request {
            status: 404,
            message: Some("Not found.".to_string()),
        };
        assert_eq!(missing.user_message(), "Resource not found.");

        let server = DeskError::Request {
            status: 500,
            message: None,
        };
        assert_eq!(
            server.user_message(),
            "Internal server error. Please try again."
        );

        let teapot = DeskError::Request {
            status: 418,
            message: None,
        };
        assert_eq!(teapot.user_message(), "Server error.");

        let forbidden = DeskError::Request {
            status: 403,
            message: Some("Forbidden".to_string()),
        };
        assert_eq!(forbidden.user_message(), "Forbidden");
    }

    #[test]
    fn test_connection_and_unexpected_messages() {
        assert_eq!(
            DeskError::Connection("refused".to_string()).user_message(),
            "Could not connect to the server. Check your connection."
        );
        assert_eq!(
            DeskError::Unexpected("bad json".to_string()).user_message(),
            "Unexpected error. Please try again."
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = DeskError::InvalidTransition {
            from: TicketStatus::Closed,
            to: TicketStatus::New,
            allowed: vec![],
        };
        assert_eq!(
            err.to_string(),
            "cannot move ticket from 'Closed' to 'New'; valid transitions: none"
        );
    }

    #[test]
    fn test_demo_banner_prefix() {
        let err = DeskError::TicketNotFound(42);
        assert_eq!(err.banner_message(true), "Demo mode error: ticket #42 not found");
        assert_eq!(err.banner_message(false), "Resource not found.");
    }

    #[test]
    fn test_field_errors() {
        let mut errors = FieldErrors::new();
        assert!(errors.clone().into_result().is_ok());
        errors.push("title", "too short");
        errors.push("email", "invalid");
        assert_eq!(errors.get("email"), Some("invalid"));
        assert_eq!(errors.to_string(), "title: too short; email: invalid");
        assert!(errors.into_result().unwrap_err().is_validation());
    }
}
