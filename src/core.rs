//! Daemon wiring: builds the store and notifier, spawns the background jobs,
//! and tears everything down on shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cleanup::{purge_personal_goals, purge_team_goals};
use crate::config::{AppConfig, SchedulerConfig};
use crate::cron_utils::parse_schedule;
use crate::notify::BotNotifier;
use crate::queue::{spawn_notification_worker, NotificationQueue};
use crate::reminder::{log_run_summary, ReminderEngine};
use crate::scheduler::JobRunner;
use crate::state::SqliteGoalStore;
use crate::traits::{GoalStore, Notifier};

/// A running daemon: the spawned background jobs plus the shared
/// cancellation token that stops them.
pub struct Daemon {
    queue: NotificationQueue,
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Daemon {
    /// Validate the configured schedules and spawn every background job.
    pub fn start(
        store: Arc<dyn GoalStore>,
        notifier: Arc<dyn Notifier>,
        scheduler: &SchedulerConfig,
    ) -> anyhow::Result<Self> {
        let reminder_cron = parse_schedule(&scheduler.reminder_schedule)?;
        let personal_cleanup_cron = parse_schedule(&scheduler.personal_cleanup_schedule)?;
        let team_cleanup_cron = parse_schedule(&scheduler.team_cleanup_schedule)?;

        let cancel = CancellationToken::new();
        let mut handles = Vec::new();

        // On-demand notification queue for interactive send requests.
        let (queue, rx) = NotificationQueue::new(scheduler.queue_capacity);
        handles.push(spawn_notification_worker(
            rx,
            notifier.clone(),
            cancel.child_token(),
        ));

        // Daily reminder fan-out.
        let engine = Arc::new(ReminderEngine::new(store.clone(), notifier.clone()));
        let runner = JobRunner::new(
            "goal-reminder",
            reminder_cron,
            Duration::from_secs(scheduler.reminder_fallback_secs),
            cancel.child_token(),
        );
        handles.push(runner.spawn(move || {
            let engine = engine.clone();
            async move {
                let summary = engine.run(Utc::now().date_naive()).await?;
                log_run_summary(&summary);
                Ok(())
            }
        }));

        // Weekly purges, one runner per entity type.
        let purge_store = store.clone();
        let runner = JobRunner::new(
            "personal-goal-purge",
            personal_cleanup_cron,
            Duration::from_secs(scheduler.cleanup_fallback_secs),
            cancel.child_token(),
        );
        handles.push(runner.spawn(move || {
            let store = purge_store.clone();
            async move {
                purge_personal_goals(&store).await?;
                Ok(())
            }
        }));

        let purge_store = store.clone();
        let runner = JobRunner::new(
            "team-goal-purge",
            team_cleanup_cron,
            Duration::from_secs(scheduler.cleanup_fallback_secs),
            cancel.child_token(),
        );
        handles.push(runner.spawn(move || {
            let store = purge_store.clone();
            async move {
                purge_team_goals(&store).await?;
                Ok(())
            }
        }));

        Ok(Self {
            queue,
            cancel,
            handles,
        })
    }

    /// Producer handle for the on-demand notification queue. Interactive
    /// surfaces (bot handlers, APIs) enqueue one-off sends through this.
    pub fn queue(&self) -> NotificationQueue {
        self.queue.clone()
    }

    /// Cancel every job and wait for the loops to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
        info!("All background jobs stopped");
    }
}

/// Build the concrete store and notifier from config, start the daemon, and
/// block until Ctrl-C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let store: Arc<dyn GoalStore> = Arc::new(SqliteGoalStore::new(&config.state.db_path).await?);
    info!("Goal store initialized ({})", config.state.db_path);

    let notifier: Arc<dyn Notifier> = Arc::new(BotNotifier::new(
        config.notifier.bearer_token.clone(),
        Duration::from_secs(config.notifier.request_timeout_secs),
    ));

    let daemon = Daemon::start(store, notifier, &config.scheduler)?;
    info!(
        reminder = %config.scheduler.reminder_schedule,
        personal_cleanup = %config.scheduler.personal_cleanup_schedule,
        team_cleanup = %config.scheduler.team_cleanup_schedule,
        "goaltrackd running, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    daemon.shutdown().await;
    Ok(())
}
