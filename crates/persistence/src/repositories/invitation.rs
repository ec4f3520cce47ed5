//! Repository for invitation database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{CourseRoleDb, InvitationEntity};
use crate::metrics::QueryTimer;

const INVITATION_COLUMNS: &str = r#"
    id, course_id, reference, expires_at, used_at, email, name, course_role, created_at
"#;

/// Values for a new invitation row. Link invitations have no email.
#[derive(Debug, Clone)]
pub struct NewInvitation<'a> {
    pub course_id: Uuid,
    pub reference: &'a str,
    pub expires_at: Option<DateTime<Utc>>,
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
    pub course_role: CourseRoleDb,
}

/// Repository for invitation operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new invitation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an invitation.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        invitation: NewInvitation<'_>,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            INSERT INTO invitations (course_id, reference, expires_at, email, name, course_role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        ))
        .bind(invitation.course_id)
        .bind(invitation.reference)
        .bind(invitation.expires_at)
        .bind(invitation.email)
        .bind(invitation.name)
        .bind(invitation.course_role)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Finds an invitation of a course by its reference.
    pub async fn find_by_reference(
        &self,
        course_id: Uuid,
        reference: &str,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_reference");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {} FROM invitations WHERE course_id = $1 AND reference = $2",
            INVITATION_COLUMNS
        ))
        .bind(course_id)
        .bind(reference)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Finds and locks an invitation of a course by its reference.
    pub async fn lock_by_reference(
        &self,
        conn: &mut PgConnection,
        course_id: Uuid,
        reference: &str,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_invitation_by_reference");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {} FROM invitations WHERE course_id = $1 AND reference = $2 FOR UPDATE",
            INVITATION_COLUMNS
        ))
        .bind(course_id)
        .bind(reference)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Finds and locks the unused invitation for an email (case-insensitive).
    pub async fn lock_unused_by_email(
        &self,
        conn: &mut PgConnection,
        course_id: Uuid,
        email: &str,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_unused_invitation_by_email");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {} FROM invitations
            WHERE course_id = $1 AND LOWER(email) = LOWER($2) AND used_at IS NULL
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
            INVITATION_COLUMNS
        ))
        .bind(course_id)
        .bind(email)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Refreshes an unused email invitation. The name is only replaced when given.
    pub async fn refresh_unused(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        expires_at: Option<DateTime<Utc>>,
        course_role: CourseRoleDb,
        name: Option<&str>,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("refresh_unused_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            UPDATE invitations
            SET expires_at = $2, course_role = $3, name = COALESCE($4, name)
            WHERE id = $1 AND used_at IS NULL
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        ))
        .bind(id)
        .bind(expires_at)
        .bind(course_role)
        .bind(name)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Writes the role and expiration of an unused invitation.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        course_role: CourseRoleDb,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            UPDATE invitations
            SET course_role = $2, expires_at = $3
            WHERE id = $1 AND used_at IS NULL
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        ))
        .bind(id)
        .bind(course_role)
        .bind(expires_at)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Marks an invitation used. Returns 0 when it already was.
    pub async fn mark_used(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_invitation_used");
        let result = sqlx::query(
            "UPDATE invitations SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Lists the invitations of a course, newest first.
    pub async fn list_by_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invitations_by_course");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {} FROM invitations WHERE course_id = $1 ORDER BY created_at DESC, id DESC",
            INVITATION_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
