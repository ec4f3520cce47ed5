//! Connection pool gauges.

use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};

/// Publishes the pool gauges every few seconds.
pub struct PoolMetricsJob {
    pool: PgPool,
    interval_secs: u64,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            interval_secs: 10,
        }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn test_job_metadata() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/courses_test")
            .unwrap();
        let job = PoolMetricsJob::new(pool);

        assert_eq!(job.name(), "pool_metrics");
        assert_eq!(job.frequency(), JobFrequency::Seconds(10));
        assert!(job.execute().await.is_ok());
    }
}
