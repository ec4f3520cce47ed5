//! Application services and external integrations.

pub mod course;
pub mod email;
pub mod export;
pub mod invitation;
pub mod live_updates;
pub mod membership;
pub mod outbox;
pub mod tag;

pub use course::CourseService;
pub use email::EmailWorkerClient;
pub use export::ExportService;
pub use invitation::InvitationService;
pub use live_updates::HttpLiveUpdateNotifier;
pub use membership::MembershipService;
pub use outbox::{DispatchSummary, OutboxDispatcher};
pub use tag::TagService;
