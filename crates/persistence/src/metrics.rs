//! Database metrics.
//!
//! Query durations go to the `database_query_duration_seconds` histogram,
//! labelled by query name. Pool gauges are refreshed by a scheduled job.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records how long a named query took.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("database_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Publishes connection pool gauges.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_course_by_reference");
/// let result = sqlx::query_as::<_, CourseEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
///
/// A timer that is dropped without `record` (the query errored out through
/// `?`) records nothing.
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn query_name(&self) -> &'static str {
        self.query_name
    }

    /// Records the elapsed time.
    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
