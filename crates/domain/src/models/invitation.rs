//! Course invitation domain models.
//!
//! An invitation without an email is a reusable link. An invitation with an
//! email is single-use and can only be redeemed by that address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::crypto::mask_reference;
use shared::validation::validate_future_timestamp;

use super::course_role::CourseRole;

/// A stored invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub id: Uuid,
    pub course_id: Uuid,
    pub reference: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub course_role: CourseRole,
    pub created_at: DateTime<Utc>,
}

/// Link or email invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationKind {
    Link,
    Email,
}

/// Derived lifecycle status of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Active,
    Used,
    Expired,
}

impl Invitation {
    pub fn kind(&self) -> InvitationKind {
        if self.email.is_some() {
            InvitationKind::Email
        } else {
            InvitationKind::Link
        }
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Expired when an expiration is set and has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Used takes precedence over expired.
    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.is_used() {
            InvitationStatus::Used
        } else if self.is_expired_at(now) {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Active
        }
    }

    pub fn masked_reference(&self) -> String {
        mask_reference(&self.reference)
    }
}

/// Public URL of an invitation.
pub fn invitation_link(
    app_base_url: &str,
    course_reference: &str,
    invitation_reference: &str,
) -> String {
    format!(
        "{}/courses/{}/invitations/{}",
        app_base_url.trim_end_matches('/'),
        course_reference,
        invitation_reference
    )
}

/// Request to create a link invitation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateLinkInvitationRequest {
    pub course_role: CourseRole,

    #[validate(custom(function = "validate_future_timestamp"))]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request to invite a list of email addresses.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateEmailInvitationRequest {
    pub course_role: CourseRole,

    #[validate(custom(function = "validate_future_timestamp"))]
    pub expires_at: Option<DateTime<Utc>>,

    /// Comma- or newline-separated entries, `Name <email>` or bare `email`.
    #[validate(length(
        min = 1,
        max = 100000,
        message = "Emails must be between 1 and 100000 characters"
    ))]
    pub emails: String,
}

/// Request to create invitations, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreateInvitationRequest {
    Link(CreateLinkInvitationRequest),
    Email(CreateEmailInvitationRequest),
}

impl Validate for CreateInvitationRequest {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            CreateInvitationRequest::Link(request) => request.validate(),
            CreateInvitationRequest::Email(request) => request.validate(),
        }
    }
}

/// Change applied to an existing invitation, tagged by `action`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpdateInvitationRequest {
    UpdateRole { course_role: CourseRole },
    UpdateExpiresAt { expires_at: DateTime<Utc> },
    RemoveExpiration,
    Expire,
}

impl UpdateInvitationRequest {
    pub fn action_name(&self) -> &'static str {
        match self {
            UpdateInvitationRequest::UpdateRole { .. } => "update_role",
            UpdateInvitationRequest::UpdateExpiresAt { .. } => "update_expires_at",
            UpdateInvitationRequest::RemoveExpiration => "remove_expiration",
            UpdateInvitationRequest::Expire => "expire",
        }
    }
}

/// Invitation as shown to course staff.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationResponse {
    pub reference: String,
    pub masked_reference: String,
    pub link: String,
    pub kind: InvitationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub course_role: CourseRole,
    pub status: InvitationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InvitationResponse {
    pub fn new(
        invitation: Invitation,
        app_base_url: &str,
        course_reference: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            link: invitation_link(app_base_url, course_reference, &invitation.reference),
            masked_reference: invitation.masked_reference(),
            kind: invitation.kind(),
            status: invitation.status_at(now),
            reference: invitation.reference,
            email: invitation.email,
            name: invitation.name,
            course_role: invitation.course_role,
            expires_at: invitation.expires_at,
            used_at: invitation.used_at,
            created_at: invitation.created_at,
        }
    }
}

/// Response for listing invitations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitationsResponse {
    pub invitations: Vec<InvitationResponse>,
}

/// Invitation as shown to anyone holding the link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PublicInvitationResponse {
    pub course_reference: String,
    pub course_name: String,
    pub masked_reference: String,
    pub kind: InvitationKind,
    pub course_role: CourseRole,
    pub status: InvitationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// What happened to one address of an email invitation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailInvitationOutcome {
    /// A new invitation was stored and an email queued.
    Created,
    /// An unused invitation already existed and was updated in place.
    Updated,
    /// The address already belongs to a participant.
    AlreadyParticipant,
}

/// Per-address result of an email invitation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EmailInvitationResult {
    pub email: String,
    pub outcome: EmailInvitationOutcome,
}

/// Response after creating invitations.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreateInvitationResponse {
    Link { invitation: InvitationResponse },
    Email { results: Vec<EmailInvitationResult> },
}

/// Outcome of redeeming an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionOutcome {
    Enrolled,
    AlreadyEnrolled,
}

/// Response after redeeming an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RedeemInvitationResponse {
    pub outcome: RedemptionOutcome,
    pub course_reference: String,
    pub participant_reference: String,
    pub course_role: CourseRole,
    /// Where the client should go next.
    pub redirect: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation() -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            reference: "1234567890".to_string(),
            expires_at: None,
            used_at: None,
            email: None,
            name: None,
            course_role: CourseRole::Student,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_kind() {
        let mut inv = invitation();
        assert_eq!(inv.kind(), InvitationKind::Link);
        inv.email = Some("a@b.com".to_string());
        assert_eq!(inv.kind(), InvitationKind::Email);
    }

    #[test]
    fn test_status_without_expiration_is_active() {
        assert_eq!(invitation().status_at(Utc::now()), InvitationStatus::Active);
    }

    #[test]
    fn test_status_expired_at_boundary() {
        let now = Utc::now();
        let mut inv = invitation();
        inv.expires_at = Some(now);
        assert_eq!(inv.status_at(now), InvitationStatus::Expired);
        assert_eq!(
            inv.status_at(now - Duration::seconds(1)),
            InvitationStatus::Active
        );
    }

    #[test]
    fn test_status_used_wins_over_expired() {
        let now = Utc::now();
        let mut inv = invitation();
        inv.expires_at = Some(now - Duration::days(1));
        inv.used_at = Some(now - Duration::days(2));
        assert_eq!(inv.status_at(now), InvitationStatus::Used);
    }

    #[test]
    fn test_invitation_link() {
        assert_eq!(
            invitation_link("https://courses.example.com/", "111", "222"),
            "https://courses.example.com/courses/111/invitations/222"
        );
    }

    #[test]
    fn test_create_request_tagged() {
        let request: CreateInvitationRequest = serde_json::from_str(
            r#"{"type":"email","course_role":"course-staff","emails":"a@b.com"}"#,
        )
        .unwrap();
        match request {
            CreateInvitationRequest::Email(email) => {
                assert_eq!(email.course_role, CourseRole::CourseStaff);
                assert!(email.expires_at.is_none());
            }
            other => panic!("unexpected request: {:?}", other),
        }

        assert!(serde_json::from_str::<CreateInvitationRequest>(
            r#"{"type":"carrier-pigeon","course_role":"student"}"#
        )
        .is_err());
    }

    #[test]
    fn test_create_request_rejects_past_expiration() {
        let past = (Utc::now() - Duration::hours(1)).to_rfc3339();
        let json = format!(
            r#"{{"type":"link","course_role":"student","expires_at":"{}"}}"#,
            past
        );
        let request: CreateInvitationRequest = serde_json::from_str(&json).unwrap();
        assert!(request.validate().is_err());

        let future = (Utc::now() + Duration::days(7)).to_rfc3339();
        let json = format!(
            r#"{{"type":"link","course_role":"student","expires_at":"{}"}}"#,
            future
        );
        let request: CreateInvitationRequest = serde_json::from_str(&json).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_email_request_requires_text() {
        let request: CreateInvitationRequest =
            serde_json::from_str(r#"{"type":"email","course_role":"student","emails":""}"#)
                .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_actions() {
        let request: UpdateInvitationRequest =
            serde_json::from_str(r#"{"action":"expire"}"#).unwrap();
        assert_eq!(request.action_name(), "expire");

        let request: UpdateInvitationRequest =
            serde_json::from_str(r#"{"action":"update_role","course_role":"course-staff"}"#)
                .unwrap();
        assert!(matches!(
            request,
            UpdateInvitationRequest::UpdateRole {
                course_role: CourseRole::CourseStaff
            }
        ));
    }

    #[test]
    fn test_response_masks_reference() {
        let response =
            InvitationResponse::new(invitation(), "https://x.test", "555", Utc::now());
        assert_eq!(response.masked_reference, "••••••7890");
        assert_eq!(response.link, "https://x.test/courses/555/invitations/1234567890");
        assert_eq!(response.status, InvitationStatus::Active);
    }
}
