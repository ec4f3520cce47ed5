//! Repository for course participant database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{
    AccentColorDb, CourseParticipantEntity, CourseParticipantWithUserEntity, CourseRoleDb,
};
use crate::metrics::QueryTimer;

const PARTICIPANT_COLUMNS: &str = r#"
    id, user_id, course_id, reference, course_role, accent_color,
    most_recently_visited_conversation_id, created_at
"#;

/// Values for a new participant row.
#[derive(Debug, Clone)]
pub struct NewParticipant<'a> {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub reference: &'a str,
    pub course_role: CourseRoleDb,
    pub accent_color: AccentColorDb,
}

/// Repository for course participant operations.
#[derive(Clone)]
pub struct CourseParticipantRepository {
    pool: PgPool,
}

impl CourseParticipantRepository {
    /// Creates a new course participant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the participant of `user_id` in a course.
    pub async fn find_by_course_and_user(
        &self,
        course_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CourseParticipantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_participant_by_course_and_user");
        let result = sqlx::query_as::<_, CourseParticipantEntity>(&format!(
            "SELECT {} FROM course_participants WHERE course_id = $1 AND user_id = $2",
            PARTICIPANT_COLUMNS
        ))
        .bind(course_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Locks every participant row of a course, oldest first.
    ///
    /// Guards that count course staff read through this so that concurrent
    /// membership changes to the same course are serialized.
    pub async fn lock_for_course(
        &self,
        conn: &mut PgConnection,
        course_id: Uuid,
    ) -> Result<Vec<CourseParticipantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_participants_for_course");
        let result = sqlx::query_as::<_, CourseParticipantEntity>(&format!(
            r#"
            SELECT {} FROM course_participants
            WHERE course_id = $1
            ORDER BY created_at ASC, id ASC
            FOR UPDATE
            "#,
            PARTICIPANT_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Inserts a participant.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        participant: NewParticipant<'_>,
    ) -> Result<CourseParticipantEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_participant");
        let result = sqlx::query_as::<_, CourseParticipantEntity>(&format!(
            r#"
            INSERT INTO course_participants (user_id, course_id, reference, course_role, accent_color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PARTICIPANT_COLUMNS
        ))
        .bind(participant.user_id)
        .bind(participant.course_id)
        .bind(participant.reference)
        .bind(participant.course_role)
        .bind(participant.accent_color)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Changes the role of a participant.
    pub async fn update_role(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        course_role: CourseRoleDb,
    ) -> Result<CourseParticipantEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_participant_role");
        let result = sqlx::query_as::<_, CourseParticipantEntity>(&format!(
            "UPDATE course_participants SET course_role = $2 WHERE id = $1 RETURNING {}",
            PARTICIPANT_COLUMNS
        ))
        .bind(id)
        .bind(course_role)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Changes the accent color of a participant.
    pub async fn update_accent_color(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        accent_color: AccentColorDb,
    ) -> Result<CourseParticipantEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_participant_accent_color");
        let result = sqlx::query_as::<_, CourseParticipantEntity>(&format!(
            "UPDATE course_participants SET accent_color = $2 WHERE id = $1 RETURNING {}",
            PARTICIPANT_COLUMNS
        ))
        .bind(id)
        .bind(accent_color)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Deletes a participant. Authored conversations and messages are kept.
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_participant");
        let result = sqlx::query("DELETE FROM course_participants WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Checks whether a user with this email (case-insensitive) is in the course.
    pub async fn exists_with_email(
        &self,
        conn: &mut PgConnection,
        course_id: Uuid,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("participant_exists_with_email");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM course_participants cp
                JOIN users u ON u.id = cp.user_id
                WHERE cp.course_id = $1 AND LOWER(u.email) = LOWER($2)
            )
            "#,
        )
        .bind(course_id)
        .bind(email)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Lists participants with user details, course staff first, then by join date.
    pub async fn list_with_users(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<CourseParticipantWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_participants_with_users");
        let result = sqlx::query_as::<_, CourseParticipantWithUserEntity>(
            r#"
            SELECT cp.reference, cp.course_role, cp.accent_color, cp.created_at,
                   u.name AS user_name, u.email AS user_email
            FROM course_participants cp
            JOIN users u ON u.id = cp.user_id
            WHERE cp.course_id = $1
            ORDER BY (cp.course_role = 'course-staff') DESC, cp.created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Finds a participant of a course by its reference.
    pub async fn find_by_reference(
        &self,
        course_id: Uuid,
        reference: &str,
    ) -> Result<Option<CourseParticipantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_participant_by_reference");
        let result = sqlx::query_as::<_, CourseParticipantEntity>(&format!(
            "SELECT {} FROM course_participants WHERE course_id = $1 AND reference = $2",
            PARTICIPANT_COLUMNS
        ))
        .bind(course_id)
        .bind(reference)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
