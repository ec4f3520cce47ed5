//! Repository for the live-update outbox.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::CourseNotificationEntity;
use crate::metrics::QueryTimer;

const NOTIFICATION_COLUMNS: &str =
    "id, course_id, url, created_at, delivered_at, attempts, last_error, claimed_until";

/// Repository for course notification outbox operations.
#[derive(Clone)]
pub struct CourseNotificationRepository {
    pool: PgPool,
}

impl CourseNotificationRepository {
    /// Creates a new course notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a notification inside the caller's transaction.
    pub async fn append(
        &self,
        conn: &mut PgConnection,
        course_id: Uuid,
        url: &str,
    ) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("append_course_notification");
        let result = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO course_notifications (course_id, url) VALUES ($1, $2) RETURNING id",
        )
        .bind(course_id)
        .bind(url)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Claims undelivered notifications for `lease_secs`.
    ///
    /// The claim commits on its own, so delivery happens without holding row
    /// locks. Rows whose lease ran out are claimable again.
    pub async fn claim_pending(
        &self,
        limit: i64,
        max_attempts: i32,
        lease_secs: i64,
    ) -> Result<Vec<CourseNotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("claim_pending_course_notifications");
        let result = sqlx::query_as::<_, CourseNotificationEntity>(&format!(
            r#"
            UPDATE course_notifications
            SET claimed_until = NOW() + make_interval(secs => $3)
            WHERE id IN (
                SELECT id FROM course_notifications
                WHERE delivered_at IS NULL
                  AND attempts < $2
                  AND (claimed_until IS NULL OR claimed_until < NOW())
                ORDER BY created_at ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(limit)
        .bind(max_attempts)
        .bind(lease_secs as f64)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Marks notifications delivered and releases their claim.
    pub async fn mark_delivered(&self, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_course_notifications_delivered");
        let result = sqlx::query(
            r#"
            UPDATE course_notifications
            SET delivered_at = NOW(), attempts = attempts + 1, last_error = NULL, claimed_until = NULL
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Records a failed attempt and releases the claim for the next run.
    pub async fn record_failure(&self, ids: &[Uuid], error: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("record_course_notification_failures");
        let result = sqlx::query(
            r#"
            UPDATE course_notifications
            SET attempts = attempts + 1, last_error = $2, claimed_until = NULL
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(error)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Deletes delivered notifications older than `cutoff`.
    pub async fn purge_delivered_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("purge_delivered_course_notifications");
        let result = sqlx::query(
            "DELETE FROM course_notifications WHERE delivered_at IS NOT NULL AND delivered_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Counts notifications still waiting for delivery.
    pub async fn count_pending(&self, max_attempts: i32) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_pending_course_notifications");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM course_notifications WHERE delivered_at IS NULL AND attempts < $1",
        )
        .bind(max_attempts)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
