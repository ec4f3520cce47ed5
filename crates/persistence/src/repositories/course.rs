//! Repository for course database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use domain::models::course::CourseInformation;

use crate::entities::CourseEntity;
use crate::metrics::QueryTimer;

const COURSE_COLUMNS: &str = r#"
    id, reference, name, year, term, institution, code, archived_at,
    next_conversation_reference, students_may_create_polls_at, created_at
"#;

/// Repository for course operations.
#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Creates a new course repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a course by its public reference.
    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<CourseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_course_by_reference");
        let result = sqlx::query_as::<_, CourseEntity>(&format!(
            "SELECT {} FROM courses WHERE reference = $1",
            COURSE_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Re-reads a course and locks its row until the transaction ends.
    pub async fn lock_by_id(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<CourseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_course_by_id");
        let result = sqlx::query_as::<_, CourseEntity>(&format!(
            "SELECT {} FROM courses WHERE id = $1 FOR UPDATE",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Inserts a course.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        reference: &str,
        info: &CourseInformation,
    ) -> Result<CourseEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_course");
        let result = sqlx::query_as::<_, CourseEntity>(&format!(
            r#"
            INSERT INTO courses (reference, name, year, term, institution, code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COURSE_COLUMNS
        ))
        .bind(reference)
        .bind(&info.name)
        .bind(&info.year)
        .bind(&info.term)
        .bind(&info.institution)
        .bind(&info.code)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Overwrites the descriptive fields of a course.
    pub async fn update_information(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        info: &CourseInformation,
    ) -> Result<CourseEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_course_information");
        let result = sqlx::query_as::<_, CourseEntity>(&format!(
            r#"
            UPDATE courses
            SET name = $2, year = $3, term = $4, institution = $5, code = $6
            WHERE id = $1
            RETURNING {}
            "#,
            COURSE_COLUMNS
        ))
        .bind(id)
        .bind(&info.name)
        .bind(&info.year)
        .bind(&info.term)
        .bind(&info.institution)
        .bind(&info.code)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Archives (`Some`) or unarchives (`None`) a course.
    pub async fn set_archived_at(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        archived_at: Option<DateTime<Utc>>,
    ) -> Result<CourseEntity, sqlx::Error> {
        let timer = QueryTimer::new("set_course_archived_at");
        let result = sqlx::query_as::<_, CourseEntity>(&format!(
            "UPDATE courses SET archived_at = $2 WHERE id = $1 RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(id)
        .bind(archived_at)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Sets when students were allowed to create polls, or clears it.
    pub async fn set_students_may_create_polls_at(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<CourseEntity, sqlx::Error> {
        let timer = QueryTimer::new("set_course_students_may_create_polls_at");
        let result = sqlx::query_as::<_, CourseEntity>(&format!(
            "UPDATE courses SET students_may_create_polls_at = $2 WHERE id = $1 RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(id)
        .bind(since)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }
}
