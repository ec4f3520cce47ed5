//! Course lifecycle.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use domain::models::course::{CourseResponse, CreateCourseRequest, UpdateCourseRequest};
use domain::models::{default_accent_color, Course, CourseRole};
use persistence::entities::CourseRoleDb;
use persistence::repositories::{
    CourseNotificationRepository, CourseParticipantRepository, CourseRepository, NewParticipant,
    UserRepository,
};
use shared::crypto::generate_reference;

use crate::error::ApiError;
use crate::extractors::{CourseContext, StaffContext};
use crate::services::outbox::append_course_changed;

/// Re-reads the course under lock. Callers hold a transaction.
pub async fn lock_course(
    courses: &CourseRepository,
    conn: &mut PgConnection,
    course: &Course,
) -> Result<Course, ApiError> {
    courses
        .lock_by_id(conn, course.id)
        .await?
        .map(Course::from)
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))
}

pub struct CourseService {
    pool: PgPool,
    courses: CourseRepository,
    participants: CourseParticipantRepository,
    notifications: CourseNotificationRepository,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            courses: CourseRepository::new(pool.clone()),
            participants: CourseParticipantRepository::new(pool.clone()),
            notifications: CourseNotificationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Creates a course with its creator as the sole course staff member.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateCourseRequest,
    ) -> Result<CourseResponse, ApiError> {
        UserRepository::new(self.pool.clone())
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;

        let info = request.information();
        let mut tx = self.pool.begin().await?;

        let course: Course = self
            .courses
            .create(&mut *tx, &generate_reference(), &info)
            .await?
            .into();

        let participant_reference = generate_reference();
        self.participants
            .create(
                &mut *tx,
                NewParticipant {
                    user_id,
                    course_id: course.id,
                    reference: &participant_reference,
                    course_role: CourseRoleDb::CourseStaff,
                    accent_color: default_accent_color(&[]).into(),
                },
            )
            .await?;

        append_course_changed(&self.notifications, &mut *tx, &course).await?;
        tx.commit().await?;

        info!(
            course_reference = %course.reference,
            user_id = %user_id,
            "Course created"
        );

        Ok(CourseResponse::from_course(course, Some(CourseRole::CourseStaff)))
    }

    pub fn show(&self, context: CourseContext) -> CourseResponse {
        let role = context.role();
        CourseResponse::from_course(context.course, Some(role))
    }

    /// Updates name, year, term, institution and code.
    pub async fn update_information(
        &self,
        StaffContext(context): StaffContext,
        request: &UpdateCourseRequest,
    ) -> Result<CourseResponse, ApiError> {
        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &context.course).await?;
        course.ensure_not_archived()?;

        let info = request.apply_to(&course);
        let course: Course = self
            .courses
            .update_information(&mut *tx, course.id, &info)
            .await?
            .into();

        append_course_changed(&self.notifications, &mut *tx, &course).await?;
        tx.commit().await?;

        info!(course_reference = %course.reference, "Course information updated");
        Ok(CourseResponse::from_course(course, Some(context.participant.course_role)))
    }

    /// Archives or unarchives a course. Repeating the current state writes nothing.
    pub async fn set_archived(
        &self,
        StaffContext(context): StaffContext,
        archived: bool,
    ) -> Result<CourseResponse, ApiError> {
        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &context.course).await?;
        let role = Some(context.participant.course_role);

        if course.is_archived() == archived {
            return Ok(CourseResponse::from_course(course, role));
        }

        let archived_at = archived.then(Utc::now);
        let course: Course = self
            .courses
            .set_archived_at(&mut *tx, course.id, archived_at)
            .await?
            .into();

        append_course_changed(&self.notifications, &mut *tx, &course).await?;
        tx.commit().await?;

        info!(
            course_reference = %course.reference,
            archived = archived,
            "Course archive state changed"
        );
        Ok(CourseResponse::from_course(course, role))
    }

    /// Allows or forbids students to create polls.
    pub async fn set_students_may_create_polls(
        &self,
        StaffContext(context): StaffContext,
        allowed: bool,
    ) -> Result<CourseResponse, ApiError> {
        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &context.course).await?;
        let role = Some(context.participant.course_role);

        if course.students_may_create_polls_at.is_some() == allowed {
            return Ok(CourseResponse::from_course(course, role));
        }

        let course: Course = self
            .courses
            .set_students_may_create_polls_at(&mut *tx, course.id, allowed.then(Utc::now))
            .await?
            .into();

        append_course_changed(&self.notifications, &mut *tx, &course).await?;
        tx.commit().await?;

        info!(
            course_reference = %course.reference,
            students_may_create_polls = allowed,
            "Course poll setting changed"
        );
        Ok(CourseResponse::from_course(course, role))
    }
}
