//! Repository implementations for database operations.

pub mod conversation;
pub mod course;
pub mod course_notification;
pub mod course_participant;
pub mod invitation;
pub mod send_email_job;
pub mod tag;
pub mod user;

pub use conversation::ConversationRepository;
pub use course::CourseRepository;
pub use course_notification::CourseNotificationRepository;
pub use course_participant::{CourseParticipantRepository, NewParticipant};
pub use invitation::{InvitationRepository, NewInvitation};
pub use send_email_job::SendEmailJobRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
