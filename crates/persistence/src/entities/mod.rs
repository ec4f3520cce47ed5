//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod conversation;
pub mod course;
pub mod course_notification;
pub mod course_participant;
pub mod invitation;
pub mod send_email_job;
pub mod tag;
pub mod user;

pub use conversation::{ConversationExportEntity, ConversationTypeDb, MessageExportEntity};
pub use course::CourseEntity;
pub use course_notification::CourseNotificationEntity;
pub use course_participant::{
    AccentColorDb, CourseParticipantEntity, CourseParticipantWithUserEntity, CourseRoleDb,
};
pub use invitation::InvitationEntity;
pub use send_email_job::SendEmailJobEntity;
pub use tag::TagEntity;
pub use user::UserEntity;
