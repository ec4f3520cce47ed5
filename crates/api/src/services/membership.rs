//! Course participants.
//!
//! Every change re-reads the course's participants under lock, so two
//! concurrent demotions of the last course staff member cannot both pass
//! the staff check.

use sqlx::PgPool;
use tracing::{info, warn};

use domain::models::participant::{
    ListParticipantsResponse, ParticipantResponse, UpdateParticipantRequest,
};
use domain::models::CourseParticipant;
use domain::services::{
    authorize_participant_change, check_staff_invariant, MembershipChange, ParticipantChangeKind,
};
use domain::DomainError;
use persistence::repositories::{
    CourseNotificationRepository, CourseParticipantRepository, UserRepository,
};

use crate::error::ApiError;
use crate::extractors::CourseContext;
use crate::services::outbox::append_course_changed;

fn find_by_reference<'a>(
    participants: &'a [CourseParticipant],
    reference: &str,
) -> Result<&'a CourseParticipant, DomainError> {
    participants
        .iter()
        .find(|p| p.reference == reference)
        .ok_or(DomainError::NotFound("Participant"))
}

pub struct MembershipService {
    pool: PgPool,
    participants: CourseParticipantRepository,
    notifications: CourseNotificationRepository,
}

impl MembershipService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            participants: CourseParticipantRepository::new(pool.clone()),
            notifications: CourseNotificationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Lists participants, course staff first.
    pub async fn list(&self, context: &CourseContext) -> Result<ListParticipantsResponse, ApiError> {
        let participants = self
            .participants
            .list_with_users(context.course.id)
            .await?
            .into_iter()
            .map(ParticipantResponse::from)
            .collect();
        Ok(ListParticipantsResponse::new(participants))
    }

    /// Changes the role and/or accent color of a participant.
    pub async fn update(
        &self,
        context: &CourseContext,
        participant_reference: &str,
        request: &UpdateParticipantRequest,
    ) -> Result<ParticipantResponse, ApiError> {
        if request.is_empty() {
            return Err(ApiError::Validation(
                "Provide a course_role or an accent_color".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let participants: Vec<CourseParticipant> = self
            .participants
            .lock_for_course(&mut *tx, context.course.id)
            .await?
            .into_iter()
            .map(CourseParticipant::from)
            .collect();

        let target = find_by_reference(&participants, participant_reference)?.clone();
        let actor = participants
            .iter()
            .find(|p| p.id == context.participant.id)
            .ok_or(DomainError::NotFound("Participant"))?;

        let mut updated = target.clone();

        if let Some(course_role) = request.course_role {
            authorize_participant_change(actor, &target, ParticipantChangeKind::Role)?;
            if let Err(e) = check_staff_invariant(
                &participants,
                target.id,
                MembershipChange::ChangeRole(course_role),
            ) {
                warn!(
                    course_reference = %context.course.reference,
                    participant_reference = %target.reference,
                    "Rejected role change that would leave the course without staff"
                );
                return Err(e.into());
            }
            updated = self
                .participants
                .update_role(&mut *tx, target.id, course_role.into())
                .await?
                .into();
        }

        if let Some(accent_color) = request.accent_color {
            authorize_participant_change(actor, &target, ParticipantChangeKind::AccentColor)?;
            updated = self
                .participants
                .update_accent_color(&mut *tx, target.id, accent_color.into())
                .await?
                .into();
        }

        append_course_changed(&self.notifications, &mut *tx, &context.course).await?;
        tx.commit().await?;

        info!(
            course_reference = %context.course.reference,
            participant_reference = %updated.reference,
            course_role = %updated.course_role,
            accent_color = %updated.accent_color,
            "Participant updated"
        );

        let user = UserRepository::new(self.pool.clone())
            .find_by_id(updated.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(ParticipantResponse {
            reference: updated.reference,
            name: user.name,
            email: user.email,
            course_role: updated.course_role,
            accent_color: updated.accent_color,
            created_at: updated.created_at,
        })
    }

    /// Removes a participant, or lets a participant leave.
    pub async fn remove(
        &self,
        context: &CourseContext,
        participant_reference: &str,
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;
        let participants: Vec<CourseParticipant> = self
            .participants
            .lock_for_course(&mut *tx, context.course.id)
            .await?
            .into_iter()
            .map(CourseParticipant::from)
            .collect();

        let target = find_by_reference(&participants, participant_reference)?;
        let actor = participants
            .iter()
            .find(|p| p.id == context.participant.id)
            .ok_or(DomainError::NotFound("Participant"))?;

        authorize_participant_change(actor, target, ParticipantChangeKind::Remove)?;
        if let Err(e) = check_staff_invariant(&participants, target.id, MembershipChange::Remove) {
            warn!(
                course_reference = %context.course.reference,
                participant_reference = %target.reference,
                "Rejected removal of the last course staff member"
            );
            return Err(e.into());
        }

        self.participants.delete(&mut *tx, target.id).await?;
        append_course_changed(&self.notifications, &mut *tx, &context.course).await?;
        tx.commit().await?;

        info!(
            course_reference = %context.course.reference,
            participant_reference = %target.reference,
            left = actor.id == target.id,
            "Participant removed"
        );
        Ok(())
    }
}
