//! Client-side field checks for new tickets and comments.
//!
//! These run before any request is sent. Failures come back as
//! [`DeskError::Validation`] carrying one message per offending field.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DeskError, FieldErrors, Result};
use crate::ticket::{NewComment, NewTicket};

// ============================================================================
// Constants
// ============================================================================

pub const MIN_TITLE_LENGTH: usize = 5;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;
pub const MIN_REQUESTER_LENGTH: usize = 2;
pub const MAX_REQUESTER_LENGTH: usize = 100;
pub const MAX_AUTHOR_LENGTH: usize = 100;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

// ============================================================================
// Ticket Validation
// ============================================================================

/// Validates and normalizes the fields of a new ticket.
///
/// Text fields are trimmed; a blank email becomes `None` and any other email
/// is checked as given. All failing fields are reported together.
pub fn validate_new_ticket(fields: NewTicket) -> Result<NewTicket> {
    let mut errors = FieldErrors::new();

    let title = fields.title.trim().to_string();
    check_length(&mut errors, "title", &title, MIN_TITLE_LENGTH, Some(MAX_TITLE_LENGTH));

    let description = fields.description.trim().to_string();
    check_length(&mut errors, "description", &description, MIN_DESCRIPTION_LENGTH, None);

    let requester = fields.requester.trim().to_string();
    check_length(
        &mut errors,
        "requester",
        &requester,
        MIN_REQUESTER_LENGTH,
        Some(MAX_REQUESTER_LENGTH),
    );

    // A blank email means none; anything else is matched as typed
    let email = fields.email.filter(|e| !e.trim().is_empty());
    if let Some(ref address) = email
        && !is_valid_email(address)
    {
        errors.push("email", "is not a valid email address");
    }

    errors.into_result()?;

    Ok(NewTicket {
        title,
        description,
        priority: fields.priority,
        requester,
        email,
    })
}

pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

// ============================================================================
// Comment Validation
// ============================================================================

/// Validates a comment, returning it with author and content trimmed.
pub fn validate_comment(comment: NewComment) -> Result<NewComment> {
    let mut errors = FieldErrors::new();

    let author = comment.author.trim().to_string();
    if author.is_empty() {
        errors.push("author", "is required");
    } else if author.chars().count() > MAX_AUTHOR_LENGTH {
        errors.push(
            "author",
            format!("must be at most {MAX_AUTHOR_LENGTH} characters"),
        );
    }

    let content = comment.content.trim().to_string();
    if content.is_empty() {
        errors.push("content", "cannot be empty");
    }

    errors.into_result()?;
    Ok(NewComment { author, content })
}

fn check_length(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: Option<usize>,
) {
    let len = value.chars().count();
    if len == 0 {
        errors.push(field, "is required");
    } else if len < min {
        errors.push(field, format!("must be at least {min} characters"));
    } else if let Some(max) = max
        && len > max
    {
        errors.push(field, format!("must be at most {max} characters"));
    }
}

/// Shorthand used by callers that only need the field map.
pub fn field_errors(err: &DeskError) -> Option<&FieldErrors> {
    match err {
        DeskError::Validation(errors) => Some(errors),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TicketPriority;

    fn fields(title: &str, description: &str, requester: &str, email: Option<&str>) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: description.to_string(),
            priority: TicketPriority::default(),
            requester: requester.to_string(),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_ticket_is_trimmed() {
        let ticket = validate_new_ticket(fields(
            "  Printer jam on 3rd floor ",
            "Printer is stuck and beeping",
            " Jon Doe ",
            Some("  "),
        ))
        .unwrap();
        assert_eq!(ticket.title, "Printer jam on 3rd floor");
        assert_eq!(ticket.requester, "Jon Doe");
        assert_eq!(ticket.email, None);
        assert_eq!(ticket.priority, TicketPriority::Medium);
    }

    #[test]
    fn test_length_rules_count_trimmed_chars() {
        let err = validate_new_ticket(fields("  abcd  ", "too short", "J", None)).unwrap_err();
        let errors = field_errors(&err).unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("title"), Some("must be at least 5 characters"));
        assert_eq!(
            errors.get("description"),
            Some("must be at least 10 characters")
        );
        assert_eq!(errors.get("requester"), Some("must be at least 2 characters"));
    }

    #[test]
    fn test_empty_fields_are_required() {
        let err = validate_new_ticket(fields("   ", "", "", None)).unwrap_err();
        let errors = field_errors(&err).unwrap();
        assert_eq!(errors.get("title"), Some("is required"));
        assert_eq!(errors.get("description"), Some("is required"));
        assert_eq!(errors.get("requester"), Some("is required"));
    }

    #[test]
    fn test_multibyte_chars_count_once() {
        // "Ñandú" is five characters but more than five bytes
        assert!(validate_new_ticket(fields("Ñandú", "Descripción larga", "Zoë", None)).is_ok());
    }

    #[test]
    fn test_title_too_long() {
        let long = "x".repeat(MAX_TITLE_LENGTH + 1);
        let err = validate_new_ticket(fields(&long, "A long enough description", "Jon", None))
            .unwrap_err();
        assert_eq!(
            field_errors(&err).unwrap().get("title"),
            Some("must be at most 200 characters")
        );
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("maria.garcia@empresa.com"));
        assert!(!is_valid_email("maria.garcia@empresa"));
        assert!(!is_valid_email("maria garcia@empresa.com"));
        assert!(!is_valid_email("@empresa.com"));

        let err = validate_new_ticket(fields(
            "Printer jam",
            "Printer is stuck and beeping",
            "Jon",
            Some("not-an-address"),
        ))
        .unwrap_err();
        assert!(field_errors(&err).unwrap().get("email").is_some());
    }

    #[test]
    fn test_padded_email_is_rejected() {
        let err = validate_new_ticket(fields(
            "Printer jam",
            "Printer is stuck and beeping",
            "Jon",
            Some(" a@b.co "),
        ))
        .unwrap_err();
        assert_eq!(
            field_errors(&err).unwrap().get("email"),
            Some("is not a valid email address")
        );

        let ok = validate_new_ticket(fields(
            "Printer jam",
            "Printer is stuck and beeping",
            "Jon",
            Some("a@b.co"),
        ))
        .unwrap();
        assert_eq!(ok.email.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn test_comment_content_must_not_be_blank() {
        let err = validate_comment(NewComment {
            author: "User".to_string(),
            content: " \n\t ".to_string(),
        })
        .unwrap_err();
        assert_eq!(field_errors(&err).unwrap().get("content"), Some("cannot be empty"));

        let ok = validate_comment(NewComment {
            author: " User ".to_string(),
            content: " ok ".to_string(),
        })
        .unwrap();
        assert_eq!(ok.author, "User");
        assert_eq!(ok.content, "ok");
    }
}
