//! Domain error taxonomy.
//!
//! Every guard in the domain returns one of these. Guards run before any
//! write, so an error always means the store was left untouched.

use std::fmt;
use thiserror::Error;

/// Why an invitation can no longer be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationUnavailable {
    Used,
    Expired,
}

impl fmt::Display for InvitationUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvitationUnavailable::Used => write!(f, "This invitation has already been used"),
            InvitationUnavailable::Expired => write!(f, "This invitation has expired"),
        }
    }
}

/// Errors raised by domain rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    InvariantViolation(String),

    #[error("This course is archived and can no longer be modified")]
    CourseArchived { course_reference: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    ExpiredOrUsed(InvitationUnavailable),

    #[error("{0}")]
    Forbidden(String),
}

impl DomainError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// The error raised whenever a change would leave a course without staff.
    pub fn last_course_staff() -> Self {
        DomainError::InvariantViolation(
            "A course must keep at least one course staff member".to_string(),
        )
    }
}
