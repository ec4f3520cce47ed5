//! Membership rules.
//!
//! Every course that has participants keeps at least one course-staff
//! member. The checks here take the full participant list of the course, as
//! read under lock inside the same transaction as the write.

use uuid::Uuid;

use crate::errors::DomainError;
use crate::models::{CourseParticipant, CourseRole};

/// A change to one participant that may affect the course staff count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    ChangeRole(CourseRole),
    Remove,
}

/// Rejects `change` when it would leave the course without course staff.
pub fn check_staff_invariant(
    participants: &[CourseParticipant],
    target_id: Uuid,
    change: MembershipChange,
) -> Result<(), DomainError> {
    if !participants.iter().any(|p| p.id == target_id) {
        return Err(DomainError::NotFound("Participant"));
    }

    let remaining_staff = participants
        .iter()
        .filter(|p| {
            if p.id != target_id {
                return p.is_course_staff();
            }
            match change {
                MembershipChange::ChangeRole(role) => role.is_course_staff(),
                MembershipChange::Remove => false,
            }
        })
        .count();

    if remaining_staff == 0 {
        Err(DomainError::last_course_staff())
    } else {
        Ok(())
    }
}

/// Who may change what about a participant.
///
/// Only course staff change roles or remove other participants. Anyone may
/// remove themselves or pick their own accent color.
pub fn authorize_participant_change(
    actor: &CourseParticipant,
    target: &CourseParticipant,
    change: ParticipantChangeKind,
) -> Result<(), DomainError> {
    let is_self = actor.id == target.id;
    let allowed = match change {
        ParticipantChangeKind::Role => actor.is_course_staff(),
        ParticipantChangeKind::AccentColor => is_self,
        ParticipantChangeKind::Remove => is_self || actor.is_course_staff(),
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::Forbidden(match change {
            ParticipantChangeKind::Role => "Only course staff may change roles".to_string(),
            ParticipantChangeKind::AccentColor => {
                "Participants may only change their own accent color".to_string()
            }
            ParticipantChangeKind::Remove => {
                "Only course staff may remove other participants".to_string()
            }
        }))
    }
}

/// Kind of participant change, for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantChangeKind {
    Role,
    AccentColor,
    Remove,
}

/// Rejects callers that are not course staff.
pub fn require_course_staff(actor: &CourseParticipant) -> Result<(), DomainError> {
    if actor.is_course_staff() {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "This action is restricted to course staff".to_string(),
        ))
    }
}
