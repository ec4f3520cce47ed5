//! Domain models for courses and their membership.

pub mod accent_color;
pub mod course;
pub mod course_role;
pub mod email_job;
pub mod export;
pub mod invitation;
pub mod participant;
pub mod tag;
pub mod user;

pub use accent_color::{default_accent_color, is_valid_accent_color, AccentColor, ACCENT_COLORS};
pub use course::Course;
pub use course_role::{is_valid_role, CourseRole, COURSE_ROLES};
pub use email_job::MailOptions;
pub use invitation::{Invitation, InvitationKind, InvitationStatus};
pub use participant::CourseParticipant;
pub use tag::Tag;
pub use user::User;
