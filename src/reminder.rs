//! Reminder fan-out: classifies every reminder-eligible goal against today
//! and dispatches at most one notification per owner per run.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::cycle::{classify, CycleAction};
use crate::rollover::RolloverProcessor;
use crate::traits::{GoalStore, Notifier, PersonalGoalStore, TeamGoalStore};

/// Counters for one fan-out run, logged by the scheduler job.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReminderRunSummary {
    pub personal_reminders: usize,
    pub team_reminders: usize,
    pub personal_rollovers: usize,
    pub team_rollovers: usize,
    /// Records skipped because their owner already got a reminder this run.
    pub deduped: usize,
    /// Records skipped for malformed dates or delivery failure.
    pub skipped: usize,
}

pub struct ReminderEngine {
    store: Arc<dyn GoalStore>,
    notifier: Arc<dyn Notifier>,
    rollover: RolloverProcessor,
}

impl ReminderEngine {
    pub fn new(store: Arc<dyn GoalStore>, notifier: Arc<dyn Notifier>) -> Self {
        let rollover = RolloverProcessor::new(store.clone());
        Self {
            store,
            notifier,
            rollover,
        }
    }

    /// Run the personal pass then the team pass for `today`.
    pub async fn run(&self, today: NaiveDate) -> anyhow::Result<ReminderRunSummary> {
        let mut summary = ReminderRunSummary::default();
        self.run_personal_pass(today, &mut summary).await?;
        self.run_team_pass(today, &mut summary).await?;
        Ok(summary)
    }

    /// Personal pass: only unaligned personal goals get their own reminder;
    /// aligned goals are covered by their team goal's reminder. Dedup is by
    /// user id, first eligible record in scan order wins.
    async fn run_personal_pass(
        &self,
        today: NaiveDate,
        summary: &mut ReminderRunSummary,
    ) -> anyhow::Result<()> {
        let goals = self.store.personal_goals_for_reminder().await?;
        let mut seen_users: HashSet<String> = HashSet::new();

        for goal in goals {
            if goal.is_aligned {
                // The store query already filters aligned goals.
                continue;
            }

            let action = match classify(
                today,
                &goal.start_date,
                &goal.end_date_utc,
                goal.reminder_frequency,
            ) {
                Ok(action) => action,
                Err(e) => {
                    warn!(
                        user_id = %goal.user_id,
                        goal_id = %goal.goal_id,
                        "Skipping personal goal with malformed dates: {}",
                        e
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            if action == CycleAction::NoAction {
                continue;
            }

            // A NoAction record must not consume the owner's slot, so the
            // seen-set is only consulted for eligible records.
            if !seen_users.insert(goal.user_id.clone()) {
                summary.deduped += 1;
                continue;
            }

            match action {
                CycleAction::CycleEnded => {
                    // Rollover instead of a reminder; any reminder for this
                    // record is suppressed for the rest of the run.
                    if self.rollover.rollover_personal(&goal).await? {
                        summary.personal_rollovers += 1;
                    }
                }
                CycleAction::ReminderDueThreeDaysPrior | CycleAction::ReminderDuePeriodic => {
                    let before_three_days = action == CycleAction::ReminderDueThreeDaysPrior;
                    if let Err(e) = self
                        .notifier
                        .send_personal_reminder(&goal, before_three_days)
                        .await
                    {
                        warn!(
                            user_id = %goal.user_id,
                            goal_id = %goal.goal_id,
                            "Failed to deliver personal reminder: {}",
                            e
                        );
                        summary.skipped += 1;
                        continue;
                    }
                    summary.personal_reminders += 1;
                }
                CycleAction::NoAction => unreachable!(),
            }
        }

        Ok(())
    }

    /// Team pass: one reminder per team per run; cycle end cascades the
    /// rollover to every aligned personal goal.
    async fn run_team_pass(
        &self,
        today: NaiveDate,
        summary: &mut ReminderRunSummary,
    ) -> anyhow::Result<()> {
        let goals = self.store.team_goals_for_reminder().await?;
        let mut seen_teams: HashSet<String> = HashSet::new();

        for goal in goals {
            let action = match classify(
                today,
                &goal.start_date,
                &goal.end_date_utc,
                goal.reminder_frequency,
            ) {
                Ok(action) => action,
                Err(e) => {
                    warn!(
                        team_id = %goal.team_id,
                        goal_id = %goal.goal_id,
                        "Skipping team goal with malformed dates: {}",
                        e
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            if action == CycleAction::NoAction {
                continue;
            }

            if !seen_teams.insert(goal.team_id.clone()) {
                summary.deduped += 1;
                continue;
            }

            match action {
                CycleAction::CycleEnded => {
                    let outcome = self.rollover.rollover_team(&goal).await?;
                    if outcome.rolled {
                        summary.team_rollovers += 1;
                    }
                }
                CycleAction::ReminderDueThreeDaysPrior | CycleAction::ReminderDuePeriodic => {
                    let before_three_days = action == CycleAction::ReminderDueThreeDaysPrior;
                    if let Err(e) = self
                        .notifier
                        .send_team_reminder(&goal, before_three_days)
                        .await
                    {
                        warn!(
                            team_id = %goal.team_id,
                            goal_id = %goal.goal_id,
                            "Failed to deliver team reminder: {}",
                            e
                        );
                        summary.skipped += 1;
                        continue;
                    }
                    summary.team_reminders += 1;
                }
                CycleAction::NoAction => unreachable!(),
            }
        }

        Ok(())
    }
}

/// Log one run's summary at a single level so operators can grep for it.
pub fn log_run_summary(summary: &ReminderRunSummary) {
    info!(
        personal_reminders = summary.personal_reminders,
        team_reminders = summary.team_reminders,
        personal_rollovers = summary.personal_rollovers,
        team_rollovers = summary.team_rollovers,
        deduped = summary.deduped,
        skipped = summary.skipped,
        "Reminder run complete"
    );
}
