//! End-of-cycle rollover: resets per-cycle fields on a goal and cascades
//! alignment cleanup from team goals to their aligned personal goals.

use std::sync::Arc;

use tracing::{info, warn};

use crate::traits::{GoalStore, NoteStore, PersonalGoalStore, TeamGoalStore};
use crate::types::{GoalStatus, PersonalGoal, TeamGoal};

/// What a team rollover touched, for run-summary logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeamRolloverOutcome {
    pub rolled: bool,
    pub personal_goals_unaligned: usize,
}

pub struct RolloverProcessor {
    store: Arc<dyn GoalStore>,
}

impl RolloverProcessor {
    pub fn new(store: Arc<dyn GoalStore>) -> Self {
        Self { store }
    }

    /// Roll a personal goal over: clear alignment, issue a fresh cycle id,
    /// reset status, archive the goal's notes.
    ///
    /// Idempotent: the stored record is re-read and its cycle id compared to
    /// the snapshot's. A mismatch means another pass already rolled this
    /// cycle and the call is a no-op. Returns whether the rollover ran.
    pub async fn rollover_personal(&self, snapshot: &PersonalGoal) -> anyhow::Result<bool> {
        let Some(mut current) = self
            .store
            .get_personal_goal(&snapshot.user_id, &snapshot.goal_id)
            .await?
        else {
            warn!(
                user_id = %snapshot.user_id,
                goal_id = %snapshot.goal_id,
                "Personal goal vanished before rollover"
            );
            return Ok(false);
        };

        if current.goal_cycle_id != snapshot.goal_cycle_id {
            info!(
                user_id = %snapshot.user_id,
                goal_id = %snapshot.goal_id,
                "Cycle already rolled over, skipping"
            );
            return Ok(false);
        }

        current.team_goal_ids.clear();
        current.sync_alignment();
        current.status = GoalStatus::NotStarted;
        current.goal_cycle_id = uuid::Uuid::new_v4().to_string();
        // The closed goal leaves the reminder scan until the owner starts a
        // new cycle with fresh dates.
        current.is_active = false;
        self.store.upsert_personal_goal(&current).await?;

        let archived = self
            .store
            .archive_notes_for_goal(&snapshot.user_id, &snapshot.goal_id)
            .await?;

        info!(
            user_id = %snapshot.user_id,
            goal_id = %snapshot.goal_id,
            notes_archived = archived,
            "Personal goal cycle rolled over"
        );
        Ok(true)
    }

    /// Roll a team goal over: un-align every personal goal currently aligned
    /// to it, then reset the team goal's own cycle fields.
    ///
    /// Guarded by the same cycle-id comparison as the personal path, so the
    /// cascade cannot run twice for one cycle.
    pub async fn rollover_team(&self, snapshot: &TeamGoal) -> anyhow::Result<TeamRolloverOutcome> {
        let Some(mut current) = self
            .store
            .get_team_goal(&snapshot.team_id, &snapshot.goal_id)
            .await?
        else {
            warn!(
                team_id = %snapshot.team_id,
                goal_id = %snapshot.goal_id,
                "Team goal vanished before rollover"
            );
            return Ok(TeamRolloverOutcome::default());
        };

        if current.goal_cycle_id != snapshot.goal_cycle_id {
            info!(
                team_id = %snapshot.team_id,
                goal_id = %snapshot.goal_id,
                "Cycle already rolled over, skipping"
            );
            return Ok(TeamRolloverOutcome::default());
        }

        let aligned = self
            .store
            .personal_goals_aligned_to(&snapshot.goal_id)
            .await?;
        let mut unaligned = 0usize;
        for mut goal in aligned {
            goal.team_goal_ids.retain(|id| id != &snapshot.goal_id);
            goal.sync_alignment();
            if let Err(e) = self.store.upsert_personal_goal(&goal).await {
                // One stuck record must not block the rest of the cascade.
                warn!(
                    user_id = %goal.user_id,
                    goal_id = %goal.goal_id,
                    "Failed to clear alignment during team rollover: {}",
                    e
                );
                continue;
            }
            unaligned += 1;
        }

        current.goal_cycle_id = uuid::Uuid::new_v4().to_string();
        current.is_active = false;
        self.store.upsert_team_goal(&current).await?;

        info!(
            team_id = %snapshot.team_id,
            goal_id = %snapshot.goal_id,
            personal_goals_unaligned = unaligned,
            "Team goal cycle rolled over"
        );
        Ok(TeamRolloverOutcome {
            rolled: true,
            personal_goals_unaligned: unaligned,
        })
    }
}
