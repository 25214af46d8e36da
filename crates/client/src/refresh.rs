//! Periodic re-fetching of server state

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::api::ApiError;

/// Shortest allowed polling period.
pub const MIN_PERIOD: Duration = Duration::from_secs(15);

/// Longest allowed polling period.
pub const MAX_PERIOD: Duration = Duration::from_secs(30);

/// Something that can be brought up to date with the server.
#[async_trait]
pub trait Refreshable: Send + Sync {
    /// Short label used in logs.
    fn resource(&self) -> &str;

    async fn refresh(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,

    /// Another refresh of the same resource was still running.
    AlreadyRunning,
}

/// Spawns one polling task per resource.
#[derive(Debug, Clone, Copy)]
pub struct RefreshCoordinator {
    period: Duration,
}

impl RefreshCoordinator {
    /// `period` is clamped to 15-30 seconds.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.clamp(MIN_PERIOD, MAX_PERIOD),
        }
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Start polling `resource`. The first poll happens one period from now.
    ///
    /// Polling stops when the returned handle is stopped or dropped.
    pub fn spawn(&self, resource: Arc<dyn Refreshable>) -> RefreshHandle {
        let in_flight = Arc::new(Mutex::new(()));
        let period = self.period;

        let task = tokio::spawn({
            let resource = Arc::clone(&resource);
            let in_flight = Arc::clone(&in_flight);

            async move {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    interval.tick().await;

                    match run_exclusive(resource.as_ref(), &in_flight).await {
                        Ok(RefreshOutcome::Refreshed) => {}
                        Ok(RefreshOutcome::AlreadyRunning) => {
                            debug!(resource = resource.resource(), "refresh still running, skipping tick");
                        }
                        Err(error) => {
                            warn!(resource = resource.resource(), %error, "periodic refresh failed");
                        }
                    }
                }
            }
        });

        RefreshHandle {
            resource,
            in_flight,
            task,
        }
    }
}

async fn run_exclusive(
    resource: &dyn Refreshable,
    in_flight: &Mutex<()>,
) -> Result<RefreshOutcome, ApiError> {
    let Ok(_guard) = in_flight.try_lock() else {
        return Ok(RefreshOutcome::AlreadyRunning);
    };

    resource.refresh().await?;

    Ok(RefreshOutcome::Refreshed)
}

/// Owns a polling task.
pub struct RefreshHandle {
    resource: Arc<dyn Refreshable>,
    in_flight: Arc<Mutex<()>>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshHandle")
            .field("resource", &self.resource.resource())
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

impl RefreshHandle {
    /// Refresh immediately unless a refresh is already running.
    ///
    /// # Errors
    ///
    /// Returns the error from the underlying refresh.
    pub async fn refresh_now(&self) -> Result<RefreshOutcome, ApiError> {
        run_exclusive(self.resource.as_ref(), &self.in_flight).await
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use testresult::TestResult;
    use tokio::sync::Notify;

    use super::*;

    #[derive(Default)]
    struct Counter {
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Refreshable for Counter {
        fn resource(&self) -> &str {
            "counter"
        }

        async fn refresh(&self) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            Ok(())
        }
    }

    #[test]
    fn period_is_clamped() {
        assert_eq!(RefreshCoordinator::new(Duration::from_secs(1)).period(), MIN_PERIOD);
        assert_eq!(RefreshCoordinator::new(Duration::from_secs(300)).period(), MAX_PERIOD);
        assert_eq!(
            RefreshCoordinator::new(Duration::from_secs(20)).period(),
            Duration::from_secs(20)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn polls_every_period_until_stopped() {
        let counter = Arc::new(Counter::default());
        let handle = RefreshCoordinator::new(MIN_PERIOD).spawn(counter.clone());

        tokio::time::sleep(Duration::from_secs(31)).await;

        assert_eq!(counter.calls.load(Ordering::SeqCst), 2, "ticks at 15s and 30s");

        handle.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(counter.calls.load(Ordering::SeqCst), 2, "no polls after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels_polling() {
        let counter = Arc::new(Counter::default());

        drop(RefreshCoordinator::new(MIN_PERIOD).spawn(counter.clone()));
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(counter.calls.load(Ordering::SeqCst), 0, "task aborted on drop");
    }

    #[tokio::test(start_paused = true)]
    async fn manual_refresh_does_not_overlap() -> TestResult {
        let gate = Arc::new(Notify::new());
        let counter = Arc::new(Counter {
            calls: AtomicUsize::new(0),
            gate: Some(gate.clone()),
        });

        let handle = RefreshCoordinator::new(MAX_PERIOD).spawn(counter.clone());

        let (first, second) = tokio::join!(handle.refresh_now(), async {
            let outcome = handle.refresh_now().await;
            gate.notify_one();
            outcome
        });

        assert_eq!(first?, RefreshOutcome::Refreshed);
        assert_eq!(second?, RefreshOutcome::AlreadyRunning);
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1, "second call never reached the server");

        Ok(())
    }
}
