//! Invitation lifecycle rules.
//!
//! Used invitations are terminal. An expired, unused invitation can only have
//! its expiration removed or forced again.

use chrono::{DateTime, Utc};

use crate::errors::{DomainError, InvitationUnavailable};
use crate::models::invitation::UpdateInvitationRequest;
use crate::models::{CourseRole, Invitation, InvitationKind, User};

/// Values an invitation update writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvitationPatch {
    pub course_role: CourseRole,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Requested change, already parsed from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationChange {
    UpdateRole(CourseRole),
    UpdateExpiresAt(DateTime<Utc>),
    RemoveExpiration,
    Expire,
}

impl From<UpdateInvitationRequest> for InvitationChange {
    fn from(request: UpdateInvitationRequest) -> Self {
        match request {
            UpdateInvitationRequest::UpdateRole { course_role } => {
                InvitationChange::UpdateRole(course_role)
            }
            UpdateInvitationRequest::UpdateExpiresAt { expires_at } => {
                InvitationChange::UpdateExpiresAt(expires_at)
            }
            UpdateInvitationRequest::RemoveExpiration => InvitationChange::RemoveExpiration,
            UpdateInvitationRequest::Expire => InvitationChange::Expire,
        }
    }
}

fn ensure_not_used(invitation: &Invitation) -> Result<(), DomainError> {
    if invitation.is_used() {
        Err(DomainError::ExpiredOrUsed(InvitationUnavailable::Used))
    } else {
        Ok(())
    }
}

/// Not used and not expired.
pub fn ensure_usable(invitation: &Invitation, now: DateTime<Utc>) -> Result<(), DomainError> {
    ensure_not_used(invitation)?;
    if invitation.is_expired_at(now) {
        return Err(DomainError::ExpiredOrUsed(InvitationUnavailable::Expired));
    }
    Ok(())
}

/// Checks that an invitation email can be sent again.
pub fn check_resend(invitation: &Invitation, now: DateTime<Utc>) -> Result<(), DomainError> {
    if invitation.kind() != InvitationKind::Email {
        return Err(DomainError::validation(
            "Only email invitations can be resent",
        ));
    }
    ensure_usable(invitation, now)
}

/// Decides the values an update writes, or why it is rejected.
pub fn plan_invitation_change(
    invitation: &Invitation,
    change: InvitationChange,
    now: DateTime<Utc>,
) -> Result<InvitationPatch, DomainError> {
    let current = InvitationPatch {
        course_role: invitation.course_role,
        expires_at: invitation.expires_at,
    };

    match change {
        InvitationChange::UpdateRole(course_role) => {
            ensure_usable(invitation, now)?;
            Ok(InvitationPatch {
                course_role,
                ..current
            })
        }
        InvitationChange::UpdateExpiresAt(expires_at) => {
            ensure_usable(invitation, now)?;
            if expires_at <= now {
                return Err(DomainError::validation(
                    "Expiration must be in the future",
                ));
            }
            Ok(InvitationPatch {
                expires_at: Some(expires_at),
                ..current
            })
        }
        InvitationChange::RemoveExpiration => {
            ensure_not_used(invitation)?;
            Ok(InvitationPatch {
                expires_at: None,
                ..current
            })
        }
        InvitationChange::Expire => {
            ensure_not_used(invitation)?;
            Ok(InvitationPatch {
                expires_at: Some(now),
                ..current
            })
        }
    }
}

/// Checks whether `user` may redeem `invitation`.
pub fn check_redeem(
    invitation: &Invitation,
    user: &User,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    ensure_usable(invitation, now)?;

    if !user.is_email_verified() {
        return Err(DomainError::Forbidden(
            "Verify your email address before joining a course".to_string(),
        ));
    }

    if let Some(email) = invitation.email.as_deref() {
        if !user.has_email(email) {
            return Err(DomainError::Forbidden(
                "This invitation is for a different email address".to_string(),
            ));
        }
    }

    Ok(())
}
