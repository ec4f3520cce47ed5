//! Invitation engine.
//!
//! Staff create link or email invitations; anyone holding the link can look
//! an invitation up; a signed-in user redeems it to become a participant.

use std::sync::Arc;

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use domain::errors::InvitationUnavailable;
use domain::models::invitation::{
    CreateEmailInvitationRequest, CreateInvitationRequest, CreateInvitationResponse,
    CreateLinkInvitationRequest, EmailInvitationOutcome, EmailInvitationResult,
    InvitationResponse, ListInvitationsResponse, PublicInvitationResponse,
    RedeemInvitationResponse, RedemptionOutcome, UpdateInvitationRequest,
};
use domain::models::{
    default_accent_color, AccentColor, Course, CourseParticipant, Invitation, InvitationKind,
    User,
};
use domain::services::{
    check_redeem, check_resend, ensure_usable, parse_email_list, plan_invitation_change,
    InvitationChange, Invitee,
};
use domain::DomainError;
use persistence::repositories::{
    CourseNotificationRepository, CourseParticipantRepository, CourseRepository,
    InvitationRepository, NewInvitation, NewParticipant, SendEmailJobRepository, UserRepository,
};
use shared::crypto::generate_reference;

use crate::config::Config;
use crate::error::ApiError;
use crate::extractors::StaffContext;
use crate::middleware::metrics::{record_invitation_redeemed, record_invitations_created};
use crate::middleware::user_auth::UserAuth;
use crate::services::course::lock_course;
use crate::services::email::{enqueue_invitation_email, EmailWorkerClient};
use crate::services::outbox::append_course_changed;

fn kind_label(kind: InvitationKind) -> &'static str {
    match kind {
        InvitationKind::Link => "link",
        InvitationKind::Email => "email",
    }
}

fn invitation_not_found() -> ApiError {
    ApiError::NotFound("Invitation not found".to_string())
}

pub struct InvitationService {
    pool: PgPool,
    config: Arc<Config>,
    email_worker: EmailWorkerClient,
    courses: CourseRepository,
    invitations: InvitationRepository,
    participants: CourseParticipantRepository,
    email_jobs: SendEmailJobRepository,
    notifications: CourseNotificationRepository,
}

impl InvitationService {
    pub fn new(pool: PgPool, config: Arc<Config>, email_worker: EmailWorkerClient) -> Self {
        Self {
            courses: CourseRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            participants: CourseParticipantRepository::new(pool.clone()),
            email_jobs: SendEmailJobRepository::new(),
            notifications: CourseNotificationRepository::new(pool.clone()),
            pool,
            config,
            email_worker,
        }
    }

    fn response(&self, invitation: Invitation, course: &Course) -> InvitationResponse {
        InvitationResponse::new(
            invitation,
            &self.config.server.app_base_url,
            &course.reference,
            Utc::now(),
        )
    }

    /// Lists a course's invitations, newest first.
    pub async fn list(
        &self,
        StaffContext(context): StaffContext,
    ) -> Result<ListInvitationsResponse, ApiError> {
        let invitations = self
            .invitations
            .list_by_course(context.course.id)
            .await?
            .into_iter()
            .map(|entity| self.response(entity.into(), &context.course))
            .collect();
        Ok(ListInvitationsResponse { invitations })
    }

    pub async fn create(
        &self,
        context: StaffContext,
        request: CreateInvitationRequest,
    ) -> Result<CreateInvitationResponse, ApiError> {
        match request {
            CreateInvitationRequest::Link(request) => self.create_link(context, &request).await,
            CreateInvitationRequest::Email(request) => self.create_email(context, &request).await,
        }
    }

    async fn create_link(
        &self,
        StaffContext(context): StaffContext,
        request: &CreateLinkInvitationRequest,
    ) -> Result<CreateInvitationResponse, ApiError> {
        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &context.course).await?;
        course.ensure_not_archived()?;

        let invitation: Invitation = self
            .invitations
            .create(
                &mut *tx,
                NewInvitation {
                    course_id: course.id,
                    reference: &generate_reference(),
                    expires_at: request.expires_at,
                    email: None,
                    name: None,
                    course_role: request.course_role.into(),
                },
            )
            .await?
            .into();

        append_course_changed(&self.notifications, &mut *tx, &course).await?;
        tx.commit().await?;

        record_invitations_created(kind_label(InvitationKind::Link), 1);
        info!(
            course_reference = %course.reference,
            invitation = %invitation.masked_reference(),
            course_role = %invitation.course_role,
            "Link invitation created"
        );

        Ok(CreateInvitationResponse::Link {
            invitation: self.response(invitation, &course),
        })
    }

    async fn create_email(
        &self,
        StaffContext(context): StaffContext,
        request: &CreateEmailInvitationRequest,
    ) -> Result<CreateInvitationResponse, ApiError> {
        let invitees = parse_email_list(&request.emails)?;

        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &context.course).await?;
        course.ensure_not_archived()?;

        let mut results = Vec::with_capacity(invitees.len());
        for invitee in &invitees {
            let outcome = self
                .invite_email(&mut *tx, &course, invitee, request)
                .await?;
            results.push(EmailInvitationResult {
                email: invitee.email.clone(),
                outcome,
            });
        }

        let created = results
            .iter()
            .filter(|r| r.outcome == EmailInvitationOutcome::Created)
            .count();
        let changed = results
            .iter()
            .any(|r| r.outcome != EmailInvitationOutcome::AlreadyParticipant);

        if changed {
            append_course_changed(&self.notifications, &mut *tx, &course).await?;
        }
        tx.commit().await?;

        if created > 0 {
            self.email_worker.ping_in_background();
        }
        record_invitations_created(kind_label(InvitationKind::Email), created);
        info!(
            course_reference = %course.reference,
            entries = results.len(),
            created = created,
            "Email invitations processed"
        );

        Ok(CreateInvitationResponse::Email { results })
    }

    /// Handles one address of an email batch inside the batch transaction.
    async fn invite_email(
        &self,
        conn: &mut PgConnection,
        course: &Course,
        invitee: &Invitee,
        request: &CreateEmailInvitationRequest,
    ) -> Result<EmailInvitationOutcome, ApiError> {
        if self
            .participants
            .exists_with_email(&mut *conn, course.id, &invitee.email)
            .await?
        {
            return Ok(EmailInvitationOutcome::AlreadyParticipant);
        }

        if let Some(existing) = self
            .invitations
            .lock_unused_by_email(&mut *conn, course.id, &invitee.email)
            .await?
        {
            self.invitations
                .refresh_unused(
                    &mut *conn,
                    existing.id,
                    request.expires_at,
                    request.course_role.into(),
                    invitee.name.as_deref(),
                )
                .await?;
            return Ok(EmailInvitationOutcome::Updated);
        }

        let invitation: Invitation = self
            .invitations
            .create(
                &mut *conn,
                NewInvitation {
                    course_id: course.id,
                    reference: &generate_reference(),
                    expires_at: request.expires_at,
                    email: Some(&invitee.email),
                    name: invitee.name.as_deref(),
                    course_role: request.course_role.into(),
                },
            )
            .await?
            .into();

        enqueue_invitation_email(&self.email_jobs, &mut *conn, &self.config, course, &invitation)
            .await?;
        Ok(EmailInvitationOutcome::Created)
    }

    /// Queues the invitation email again.
    pub async fn resend(
        &self,
        StaffContext(context): StaffContext,
        invitation_reference: &str,
    ) -> Result<InvitationResponse, ApiError> {
        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &context.course).await?;
        course.ensure_not_archived()?;

        let invitation: Invitation = self
            .invitations
            .lock_by_reference(&mut *tx, course.id, invitation_reference)
            .await?
            .ok_or_else(invitation_not_found)?
            .into();
        check_resend(&invitation, Utc::now())?;

        enqueue_invitation_email(&self.email_jobs, &mut *tx, &self.config, &course, &invitation)
            .await?;
        tx.commit().await?;

        self.email_worker.ping_in_background();
        info!(
            course_reference = %course.reference,
            invitation = %invitation.masked_reference(),
            "Invitation email resent"
        );

        Ok(self.response(invitation, &course))
    }

    /// Changes the role or the expiration of an invitation.
    pub async fn update(
        &self,
        StaffContext(context): StaffContext,
        invitation_reference: &str,
        request: UpdateInvitationRequest,
    ) -> Result<InvitationResponse, ApiError> {
        let action = request.action_name();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &context.course).await?;
        course.ensure_not_archived()?;

        let invitation: Invitation = self
            .invitations
            .lock_by_reference(&mut *tx, course.id, invitation_reference)
            .await?
            .ok_or_else(invitation_not_found)?
            .into();

        let patch = match plan_invitation_change(&invitation, InvitationChange::from(request), now)
        {
            Ok(patch) => patch,
            Err(e) => {
                warn!(
                    course_reference = %course.reference,
                    invitation = %invitation.masked_reference(),
                    action = action,
                    error = %e,
                    "Rejected invitation update"
                );
                return Err(e.into());
            }
        };

        let updated: Invitation = self
            .invitations
            .update(
                &mut *tx,
                invitation.id,
                patch.course_role.into(),
                patch.expires_at,
            )
            .await?
            .into();

        append_course_changed(&self.notifications, &mut *tx, &course).await?;
        tx.commit().await?;

        info!(
            course_reference = %course.reference,
            invitation = %updated.masked_reference(),
            action = action,
            "Invitation updated"
        );

        Ok(self.response(updated, &course))
    }

    async fn find_course_and_invitation(
        &self,
        course_reference: &str,
        invitation_reference: &str,
    ) -> Result<(Course, Invitation), ApiError> {
        let course: Course = self
            .courses
            .find_by_reference(course_reference)
            .await?
            .ok_or_else(invitation_not_found)?
            .into();
        let invitation: Invitation = self
            .invitations
            .find_by_reference(course.id, invitation_reference)
            .await?
            .ok_or_else(invitation_not_found)?
            .into();
        Ok((course, invitation))
    }

    /// Public view of an invitation for whoever holds the link.
    pub async fn show(
        &self,
        course_reference: &str,
        invitation_reference: &str,
    ) -> Result<PublicInvitationResponse, ApiError> {
        let (course, invitation) = self
            .find_course_and_invitation(course_reference, invitation_reference)
            .await?;

        Ok(PublicInvitationResponse {
            masked_reference: invitation.masked_reference(),
            kind: invitation.kind(),
            course_role: invitation.course_role,
            status: invitation.status_at(Utc::now()),
            expires_at: invitation.expires_at,
            course_reference: course.reference,
            course_name: course.name,
        })
    }

    /// Joins the signed-in user to the invitation's course.
    pub async fn redeem(
        &self,
        user: &UserAuth,
        course_reference: &str,
        invitation_reference: &str,
    ) -> Result<RedeemInvitationResponse, ApiError> {
        let (course, _) = self
            .find_course_and_invitation(course_reference, invitation_reference)
            .await?;
        let user: User = UserRepository::new(self.pool.clone())
            .find_by_id(user.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?
            .into();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &course).await?;
        if let Err(e) = course.ensure_not_archived() {
            warn!(
                course_reference = %course.reference,
                user_id = %user.id,
                "Rejected invitation redemption on an archived course"
            );
            return Err(e.into());
        }

        let invitation: Invitation = self
            .invitations
            .lock_by_reference(&mut *tx, course.id, invitation_reference)
            .await?
            .ok_or_else(invitation_not_found)?
            .into();
        ensure_usable(&invitation, now)?;

        let participants: Vec<CourseParticipant> = self
            .participants
            .lock_for_course(&mut *tx, course.id)
            .await?
            .into_iter()
            .map(CourseParticipant::from)
            .collect();

        if let Some(existing) = participants.iter().find(|p| p.user_id == user.id) {
            return Ok(RedeemInvitationResponse {
                outcome: RedemptionOutcome::AlreadyEnrolled,
                course_reference: course.reference.clone(),
                participant_reference: existing.reference.clone(),
                course_role: existing.course_role,
                redirect: course.path(),
            });
        }

        if let Err(e) = check_redeem(&invitation, &user, now) {
            warn!(
                course_reference = %course.reference,
                invitation = %invitation.masked_reference(),
                user_id = %user.id,
                error = %e,
                "Rejected invitation redemption"
            );
            return Err(e.into());
        }

        let taken: Vec<AccentColor> = participants.iter().map(|p| p.accent_color).collect();
        let participant: CourseParticipant = self
            .participants
            .create(
                &mut *tx,
                NewParticipant {
                    user_id: user.id,
                    course_id: course.id,
                    reference: &generate_reference(),
                    course_role: invitation.course_role.into(),
                    accent_color: default_accent_color(&taken).into(),
                },
            )
            .await?
            .into();

        if invitation.kind() == InvitationKind::Email
            && self.invitations.mark_used(&mut *tx, invitation.id).await? == 0
        {
            return Err(DomainError::ExpiredOrUsed(InvitationUnavailable::Used).into());
        }

        append_course_changed(&self.notifications, &mut *tx, &course).await?;
        tx.commit().await?;

        record_invitation_redeemed(kind_label(invitation.kind()));
        info!(
            course_reference = %course.reference,
            invitation = %invitation.masked_reference(),
            participant_reference = %participant.reference,
            course_role = %participant.course_role,
            "Invitation redeemed"
        );

        Ok(RedeemInvitationResponse {
            outcome: RedemptionOutcome::Enrolled,
            redirect: course.path(),
            course_reference: course.reference,
            participant_reference: participant.reference,
            course_role: participant.course_role,
        })
    }
}
