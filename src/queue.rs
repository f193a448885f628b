//! On-demand notification queue.
//!
//! Interactive handlers enqueue discrete send requests; a single dedicated
//! worker task consumes them one at a time. A failed delivery is logged and
//! the worker keeps dequeuing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::traits::Notifier;
use crate::types::{PersonalGoal, TeamGoal};

/// A single notification-send request.
#[derive(Debug, Clone)]
pub enum NotificationRequest {
    Personal {
        goal: PersonalGoal,
        before_three_days: bool,
    },
    Team {
        goal: TeamGoal,
        before_three_days: bool,
    },
}

/// Producer handle for the notification queue.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<NotificationRequest>,
}

impl NotificationQueue {
    /// Create the queue and its receiver half for the worker.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NotificationRequest>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue a request. A full queue drops the request with a warning;
    /// the reminder is simply missed until its next qualifying date.
    pub fn enqueue(&self, request: NotificationRequest) {
        if let Err(e) = self.tx.try_send(request) {
            warn!("Notification queue full, dropping request: {}", e);
        }
    }
}

/// Spawn the dedicated worker consuming the queue until cancellation or
/// until every producer handle is dropped.
pub fn spawn_notification_worker(
    mut rx: mpsc::Receiver<NotificationRequest>,
    notifier: Arc<dyn Notifier>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Notification worker started");

        loop {
            let request = tokio::select! {
                _ = cancel.cancelled() => break,
                item = rx.recv() => match item {
                    Some(request) => request,
                    None => break,
                },
            };

            let result = match &request {
                NotificationRequest::Personal {
                    goal,
                    before_three_days,
                } => notifier.send_personal_reminder(goal, *before_three_days).await,
                NotificationRequest::Team {
                    goal,
                    before_three_days,
                } => notifier.send_team_reminder(goal, *before_three_days).await,
            };

            if let Err(e) = result {
                warn!("Queued notification delivery failed: {}", e);
            }
        }

        info!("Notification worker stopped");
    })
}
