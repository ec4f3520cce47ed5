//! Domain layer for the courses backend.
//!
//! This crate contains:
//! - Domain models (Course, CourseParticipant, Invitation, Tag)
//! - Membership, invitation and tag rules
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;

pub use errors::{DomainError, InvitationUnavailable};
