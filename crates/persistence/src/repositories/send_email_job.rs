//! Repository for the outgoing email queue.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgConnection;

use domain::models::MailOptions;

use crate::entities::SendEmailJobEntity;
use crate::metrics::QueryTimer;

/// Repository for send email job operations.
///
/// Jobs are only ever written inside the transaction of the change that
/// produced them, so the repository holds no pool of its own.
#[derive(Clone, Default)]
pub struct SendEmailJobRepository;

impl SendEmailJobRepository {
    /// Creates a new send email job repository.
    pub fn new() -> Self {
        Self
    }

    /// Queues an email inside the caller's transaction.
    pub async fn enqueue(
        &self,
        conn: &mut PgConnection,
        start_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        mail_options: &MailOptions,
    ) -> Result<SendEmailJobEntity, sqlx::Error> {
        let timer = QueryTimer::new("enqueue_send_email_job");
        let result = sqlx::query_as::<_, SendEmailJobEntity>(
            r#"
            INSERT INTO send_email_jobs (start_at, expires_at, mail_options)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, start_at, expires_at, mail_options
            "#,
        )
        .bind(start_at)
        .bind(expires_at)
        .bind(Json(mail_options))
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }
}
