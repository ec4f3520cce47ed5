//! Repository for tag database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::TagEntity;
use crate::metrics::QueryTimer;

const TAG_COLUMNS: &str = r#"id, course_id, reference, "order", name, course_staff_only_at, created_at"#;

/// Repository for tag operations.
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Creates a new tag repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists the tags of a course in order.
    pub async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<TagEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_tags_by_course");
        let result = sqlx::query_as::<_, TagEntity>(&format!(
            r#"SELECT {} FROM tags WHERE course_id = $1 ORDER BY "order" ASC"#,
            TAG_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Locks the tags of a course for a replacement.
    pub async fn lock_for_course(
        &self,
        conn: &mut PgConnection,
        course_id: Uuid,
    ) -> Result<Vec<TagEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_tags_for_course");
        let result = sqlx::query_as::<_, TagEntity>(&format!(
            r#"SELECT {} FROM tags WHERE course_id = $1 ORDER BY "order" ASC FOR UPDATE"#,
            TAG_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Inserts a tag.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        course_id: Uuid,
        reference: &str,
        order: i32,
        name: &str,
        course_staff_only_at: Option<DateTime<Utc>>,
    ) -> Result<TagEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_tag");
        let result = sqlx::query_as::<_, TagEntity>(&format!(
            r#"
            INSERT INTO tags (course_id, reference, "order", name, course_staff_only_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TAG_COLUMNS
        ))
        .bind(course_id)
        .bind(reference)
        .bind(order)
        .bind(name)
        .bind(course_staff_only_at)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Overwrites the order, name and staff-only timestamp of a tag.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        order: i32,
        name: &str,
        course_staff_only_at: Option<DateTime<Utc>>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_tag");
        let result = sqlx::query(
            r#"
            UPDATE tags
            SET "order" = $2, name = $3, course_staff_only_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(order)
        .bind(name)
        .bind(course_staff_only_at)
        .execute(&mut *conn)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Deletes a tag. Its taggings go with it.
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_tag");
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
