//! Custom Axum extractors.

pub mod course_context;
pub mod user_auth;

pub use course_context::{CourseContext, StaffContext};
