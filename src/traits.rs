use async_trait::async_trait;

use crate::types::{PersonalGoal, PersonalGoalNote, TeamGoal};

/// Query and update access to personal goal records.
///
/// Background jobs hold no persistent ownership of records, only transient
/// read/update access within a single run. Batch deletes are best-effort: a
/// partial failure is reported but must not poison the surviving records.
#[async_trait]
pub trait PersonalGoalStore: Send + Sync {
    /// Active, non-deleted, reminder-active personal goals that are NOT
    /// aligned to any team goal. Ordered by (user_id, goal_id) so the
    /// fan-out dedup tie-break is deterministic.
    async fn personal_goals_for_reminder(&self) -> anyhow::Result<Vec<PersonalGoal>>;

    /// Personal goals whose aligned set contains `team_goal_id`.
    async fn personal_goals_aligned_to(
        &self,
        team_goal_id: &str,
    ) -> anyhow::Result<Vec<PersonalGoal>>;

    /// Point read for the rollover idempotence guard.
    async fn get_personal_goal(
        &self,
        user_id: &str,
        goal_id: &str,
    ) -> anyhow::Result<Option<PersonalGoal>>;

    async fn upsert_personal_goal(&self, goal: &PersonalGoal) -> anyhow::Result<()>;

    /// Soft-deleted personal goals awaiting the weekly purge.
    async fn deleted_personal_goals(&self) -> anyhow::Result<Vec<PersonalGoal>>;

    /// Permanently remove the given personal goals. Returns the number of
    /// records actually removed.
    async fn delete_personal_goals(&self, goals: &[PersonalGoal]) -> anyhow::Result<usize>;
}

/// Query and update access to team goal records.
#[async_trait]
pub trait TeamGoalStore: Send + Sync {
    /// Active, non-deleted, reminder-active team goals, ordered by
    /// (team_id, goal_id).
    async fn team_goals_for_reminder(&self) -> anyhow::Result<Vec<TeamGoal>>;

    async fn get_team_goal(&self, team_id: &str, goal_id: &str)
        -> anyhow::Result<Option<TeamGoal>>;

    async fn upsert_team_goal(&self, goal: &TeamGoal) -> anyhow::Result<()>;

    /// Soft-deleted team goals awaiting the weekly purge.
    async fn deleted_team_goals(&self) -> anyhow::Result<Vec<TeamGoal>>;

    /// Permanently remove the given team goals. Returns the number of
    /// records actually removed.
    async fn delete_team_goals(&self, goals: &[TeamGoal]) -> anyhow::Result<usize>;
}

/// Access to personal goal notes, archived when the parent cycle rolls over.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Archive (deactivate) every note attached to a personal goal.
    /// Returns the number of notes archived.
    async fn archive_notes_for_goal(
        &self,
        user_id: &str,
        personal_goal_id: &str,
    ) -> anyhow::Result<usize>;

    /// Notes currently attached to a personal goal.
    async fn notes_for_goal(
        &self,
        user_id: &str,
        personal_goal_id: &str,
    ) -> anyhow::Result<Vec<PersonalGoalNote>>;

    async fn upsert_note(&self, note: &PersonalGoalNote) -> anyhow::Result<()>;
}

/// Everything the background jobs need from storage.
pub trait GoalStore: Send + Sync + PersonalGoalStore + TeamGoalStore + NoteStore {}

/// Outbound reminder delivery (bot conversation, channel post, ...).
///
/// `before_three_days` selects the end-of-cycle card template instead of the
/// periodic one. Delivery is best-effort: callers log failures per record
/// and move on, never retrying within the run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_personal_reminder(
        &self,
        goal: &PersonalGoal,
        before_three_days: bool,
    ) -> anyhow::Result<()>;

    async fn send_team_reminder(
        &self,
        goal: &TeamGoal,
        before_three_days: bool,
    ) -> anyhow::Result<()>;
}
