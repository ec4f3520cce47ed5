//! Domain services for courses.
//!
//! Pure decisions over already-loaded state. Callers load the rows, ask a
//! service what to do, then write.

pub mod email_list;
pub mod export;
pub mod invitation_policy;
pub mod membership;
pub mod notification;
pub mod tag_plan;

pub use email_list::{parse_email_list, Invitee};
pub use export::{anonymize_mentions, author_label, build_course_export};
pub use invitation_policy::{
    check_redeem, check_resend, ensure_usable, plan_invitation_change, InvitationChange,
    InvitationPatch,
};
pub use membership::{
    authorize_participant_change, check_staff_invariant, require_course_staff, MembershipChange,
    ParticipantChangeKind,
};
pub use notification::{LiveUpdateNotifier, MockLiveUpdateNotifier, NotifyError};
pub use tag_plan::{plan_tag_replacement, TagInsert, TagPlan, TagUpdate};
