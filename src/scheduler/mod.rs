use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::interfaces::scheduler::ScheduledJob;

/// Runs each registered job on its own fixed interval until stopped.
pub struct Scheduler {
    jobs: Vec<Arc<dyn ScheduledJob>>,
    handles: Vec<JoinHandle<()>>,
    stop: Option<watch::Sender<bool>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            handles: Vec::new(),
            stop: None,
        }
    }

    pub fn register_job(&mut self, job: Arc<dyn ScheduledJob>) {
        self.jobs.push(job);
    }

    pub fn is_running(&self) -> bool {
        self.stop.is_some()
    }

    pub fn start(&mut self) {
        if self.stop.is_some() {
            return;
        }
        let (tx, rx) = watch::channel(false);
        self.stop = Some(tx);

        for job in &self.jobs {
            let job = Arc::clone(job);
            let period = job.interval();
            let first = if job.run_on_start() {
                Instant::now()
            } else {
                Instant::now() + period
            };
            let mut tick = tokio::time::interval_at(first, period);
            // Overrun ticks are dropped, not replayed.
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut rx = rx.clone();
            tracing::debug!(job = job.name(), interval = ?job.interval(), "scheduling job");
            let handle = tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tick.tick() => {
                            if let Err(err) = job.run().await {
                                tracing::warn!(job = job.name(), "scheduled job failed: {err}");
                            }
                        }
                        _ = rx.changed() => {
                            if *rx.borrow() {
                                break;
                            }
                        }
                    }
                }
            });
            self.handles.push(handle);
        }
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(true);
        }
        let handles = std::mem::take(&mut self.handles);
        for handle in handles {
            let _ = handle.await;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

pub fn seconds(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        fn name(&self) -> &str {
            "counting"
        }

        fn interval(&self) -> Duration {
            Duration::from_millis(10)
        }

        async fn run(&self) -> crate::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Err(crate::error::AgentError::Rpc("boom".to_string()))
        }
    }

    struct DeferredJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl ScheduledJob for DeferredJob {
        fn name(&self) -> &str {
            "deferred"
        }

        fn interval(&self) -> Duration {
            Duration::from_secs(3600)
        }

        fn run_on_start(&self) -> bool {
            false
        }

        async fn run(&self) -> crate::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn deferred_job_waits_one_interval() {
        let job = Arc::new(DeferredJob {
            runs: AtomicUsize::new(0),
        });
        let mut scheduler = Scheduler::new();
        scheduler.register_job(job.clone());
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(30)).await;
        scheduler.stop().await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn keeps_running_after_failures_and_stops_on_request() {
        let job = Arc::new(CountingJob {
            runs: AtomicUsize::new(0),
        });
        let mut scheduler = Scheduler::new();
        scheduler.register_job(job.clone());
        scheduler.start();
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.stop().await;
        assert!(!scheduler.is_running());

        let runs = job.runs.load(Ordering::SeqCst);
        assert!(runs >= 2, "expected repeated runs, got {runs}");
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), runs);
    }
}
