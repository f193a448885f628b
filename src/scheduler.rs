//! Calendar-driven job runner.
//!
//! Each background job owns one `JobRunner`: compute the next occurrence of
//! its cron schedule, sleep until then, run the body, repeat. A failed run or
//! an uncomputable next occurrence logs and falls back to a fixed delay; only
//! cancellation exits the loop.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cron_utils::compute_next_run;

pub struct JobRunner {
    name: &'static str,
    cron_expr: String,
    /// Sleep used when the next occurrence cannot be computed.
    fallback: Duration,
    cancel: CancellationToken,
}

impl JobRunner {
    pub fn new(
        name: &'static str,
        cron_expr: String,
        fallback: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            name,
            cron_expr,
            fallback,
            cancel,
        }
    }

    /// Spawn the run loop as a background task. The loop survives every
    /// business-logic error; it exits only when the cancellation token fires.
    pub fn spawn<F, Fut>(self, run: F) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        tokio::spawn(async move {
            info!(job = self.name, cron = %self.cron_expr, "Job runner started");

            loop {
                let delay = match compute_next_run(&self.cron_expr) {
                    Ok(next) => (next - Utc::now()).to_std().unwrap_or(Duration::ZERO),
                    Err(e) => {
                        error!(
                            job = self.name,
                            "Failed to compute next run, sleeping fallback {:?}: {}",
                            self.fallback,
                            e
                        );
                        self.fallback
                    }
                };

                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }

                if self.cancel.is_cancelled() {
                    break;
                }

                match run().await {
                    Ok(()) => info!(job = self.name, "Job run complete"),
                    Err(e) => error!(job = self.name, "Job run failed: {}", e),
                }
            }

            info!(job = self.name, "Job runner stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fallback_delay_keeps_loop_alive() {
        // Unparseable cron: every iteration takes the fallback path, so the
        // body still runs and keeps running after it errors.
        let cancel = CancellationToken::new();
        let runner = JobRunner::new(
            "test-fallback",
            "not a cron".to_string(),
            Duration::from_millis(10),
            cancel.clone(),
        );

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let handle = runner.spawn(move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    anyhow::bail!("simulated run failure");
                }
                Ok(())
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(runs.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_cancellation_exits_during_sleep() {
        // Daily midnight schedule: the runner is asleep for hours; cancelling
        // must end the task promptly.
        let cancel = CancellationToken::new();
        let runner = JobRunner::new(
            "test-cancel",
            "0 0 * * *".to_string(),
            Duration::from_secs(60),
            cancel.clone(),
        );

        let handle = runner.spawn(|| async { Ok(()) });
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("runner should exit promptly on cancellation")
            .unwrap();
    }
}
