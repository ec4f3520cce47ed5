//! Interval scheduler for the outbox and pool jobs.
//!
//! Each job runs in its own task on a fixed interval. A failed run is logged
//! and counted; the job keeps its schedule. Stopping the scheduler waits for
//! in-flight runs, bounded by a timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::middleware::metrics::record_job_run;

/// How often a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFrequency {
    Seconds(u64),
    Hourly,
}

impl JobFrequency {
    /// Interval between runs, at least one second.
    pub fn duration(&self) -> Duration {
        match self {
            JobFrequency::Seconds(secs) => Duration::from_secs((*secs).max(1)),
            JobFrequency::Hourly => Duration::from_secs(60 * 60),
        }
    }
}

/// A background job.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    fn frequency(&self) -> JobFrequency;

    async fn execute(&self) -> Result<(), String>;
}

/// Runs `job` on its interval until `stop` flips to true. The first run
/// happens one interval after start.
async fn run_on_interval(job: Arc<dyn Job>, mut stop: watch::Receiver<bool>) {
    let name = job.name();
    let period = job.frequency().duration();
    let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                let started = Instant::now();
                let result = job.execute().await;
                let elapsed = started.elapsed();
                record_job_run(name, result.is_ok(), elapsed.as_secs_f64());

                match result {
                    Ok(()) => {
                        debug!(job = name, elapsed_ms = elapsed.as_millis(), "Job run finished");
                    }
                    Err(e) => {
                        error!(job = name, elapsed_ms = elapsed.as_millis(), error = %e, "Job run failed");
                    }
                }
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    debug!(job = name, "Job stopped");
                    return;
                }
            }
        }
    }
}

/// Owns the registered jobs and their tasks.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    stop: watch::Sender<bool>,
    tasks: JoinSet<()>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            stop,
            tasks: JoinSet::new(),
        }
    }

    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    /// Registered job names, in registration order.
    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|job| job.name()).collect()
    }

    /// Spawns one task per registered job.
    pub fn start(&mut self) {
        for job in &self.jobs {
            info!(job = job.name(), every = ?job.frequency(), "Scheduling background job");
            self.tasks.spawn(run_on_interval(Arc::clone(job), self.stop.subscribe()));
        }
    }

    /// Tells every job to stop and waits up to `timeout` for in-flight runs.
    pub async fn shutdown(mut self, timeout: Duration) {
        let _ = self.stop.send(true);

        let drained = tokio::time::timeout(timeout, async {
            while let Some(joined) = self.tasks.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "Background job task ended abnormally");
                }
            }
        })
        .await;

        match drained {
            Ok(()) => info!("Background jobs stopped"),
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "Background jobs did not stop in time");
                self.tasks.abort_all();
            }
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingJob {
        runs: Arc<AtomicUsize>,
        fails: bool,
    }

    impl CountingJob {
        fn new(runs: &Arc<AtomicUsize>, fails: bool) -> Self {
            Self {
                runs: Arc::clone(runs),
                fails,
            }
        }
    }

    #[async_trait::async_trait]
    impl Job for CountingJob {
        fn name(&self) -> &'static str {
            "counting_job"
        }

        fn frequency(&self) -> JobFrequency {
            JobFrequency::Seconds(1)
        }

        async fn execute(&self) -> Result<(), String> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_frequency_duration() {
        assert_eq!(JobFrequency::Seconds(30).duration(), Duration::from_secs(30));
        assert_eq!(JobFrequency::Seconds(0).duration(), Duration::from_secs(1));
        assert_eq!(JobFrequency::Hourly.duration(), Duration::from_secs(3600));
    }

    #[test]
    fn test_register() {
        let mut scheduler = JobScheduler::default();
        assert!(scheduler.job_names().is_empty());

        scheduler.register(CountingJob::new(&Arc::new(AtomicUsize::new(0)), false));
        assert_eq!(scheduler.job_names(), vec!["counting_job"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_job_keeps_its_schedule() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = JobScheduler::new();
        scheduler.register(CountingJob::new(&runs, true));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        scheduler.shutdown(Duration::from_secs(2)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_first_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = JobScheduler::new();
        scheduler.register(CountingJob::new(&runs, false));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.shutdown(Duration::from_secs(2)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
