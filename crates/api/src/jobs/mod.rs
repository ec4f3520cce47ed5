//! Background job scheduler and job implementations.

mod outbox_dispatch;
mod outbox_purge;
mod pool_metrics;
mod scheduler;

pub use outbox_dispatch::OutboxDispatchJob;
pub use outbox_purge::OutboxPurgeJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
