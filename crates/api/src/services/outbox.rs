//! Course-changed notification outbox.
//!
//! Mutations append a row in their own transaction; the dispatcher claims
//! rows and delivers them to the live-update server later. A delivery failure never affects the
//! mutation that produced it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use domain::models::Course;
use domain::services::LiveUpdateNotifier;
use persistence::repositories::CourseNotificationRepository;

use crate::config::LiveUpdatesConfig;
use crate::middleware::metrics::{record_outbox_delivered, record_outbox_failed};

/// Records that `course` changed, inside the caller's transaction.
pub async fn append_course_changed(
    notifications: &CourseNotificationRepository,
    conn: &mut PgConnection,
    course: &Course,
) -> Result<Uuid, sqlx::Error> {
    notifications.append(conn, course.id, &course.path()).await
}

/// Result of one dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn is_empty(&self) -> bool {
        self.delivered == 0 && self.failed == 0
    }
}

/// Drains pending notifications.
pub struct OutboxDispatcher {
    notifications: CourseNotificationRepository,
    notifier: Arc<dyn LiveUpdateNotifier>,
    batch_size: i64,
    max_attempts: i32,
    claim_lease_secs: i64,
}

impl OutboxDispatcher {
    pub fn new(
        pool: PgPool,
        notifier: Arc<dyn LiveUpdateNotifier>,
        config: &LiveUpdatesConfig,
    ) -> Self {
        Self {
            notifications: CourseNotificationRepository::new(pool),
            notifier,
            batch_size: config.dispatch_batch_size,
            max_attempts: config.max_attempts,
            claim_lease_secs: config.claim_lease_secs,
        }
    }

    /// Claims one batch and delivers it.
    ///
    /// Claimed rows are hidden from other dispatchers until settled or until
    /// the lease runs out. Several rows for the same course collapse into one
    /// call.
    pub async fn dispatch_pending(&self) -> Result<DispatchSummary, sqlx::Error> {
        let pending = self
            .notifications
            .claim_pending(self.batch_size, self.max_attempts, self.claim_lease_secs)
            .await?;

        if pending.is_empty() {
            return Ok(DispatchSummary::default());
        }

        let mut by_url: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();
        for row in pending {
            by_url.entry(row.url).or_default().push(row.id);
        }

        let mut summary = DispatchSummary::default();
        for (url, ids) in by_url {
            match self.notifier.notify(&url).await {
                Ok(()) => {
                    self.notifications.mark_delivered(&ids).await?;
                    debug!(url = %url, rows = ids.len(), "Live update delivered");
                    summary.delivered += ids.len();
                }
                Err(e) => {
                    let error = e.to_string();
                    self.notifications.record_failure(&ids, &error).await?;
                    warn!(url = %url, rows = ids.len(), error = %error, "Live update delivery failed");
                    summary.failed += ids.len();
                }
            }
        }

        record_outbox_delivered(summary.delivered);
        record_outbox_failed(summary.failed);
        Ok(summary)
    }

    /// Deletes delivered notifications older than `retention_days`.
    pub async fn purge_delivered(&self, retention_days: i64) -> Result<u64, sqlx::Error> {
        self.notifications
            .purge_delivered_before(retention_cutoff(Utc::now(), retention_days))
            .await
    }
}

/// Oldest delivery time that is kept.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: i64) -> DateTime<Utc> {
    now - Duration::days(retention_days.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_cutoff() {
        let now = Utc::now();
        assert_eq!(retention_cutoff(now, 7), now - Duration::days(7));
        assert_eq!(retention_cutoff(now, -3), now);
    }

    #[test]
    fn test_dispatch_summary_empty() {
        assert!(DispatchSummary::default().is_empty());
        assert!(!DispatchSummary {
            delivered: 1,
            failed: 0
        }
        .is_empty());
    }
}
