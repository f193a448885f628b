use serde::{Deserialize, Serialize};

/// Calendar-day format used for every stored goal date.
pub const GOAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Progress status of a goal within its current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::NotStarted => "not_started",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "not_started" => Ok(GoalStatus::NotStarted),
            "in_progress" => Ok(GoalStatus::InProgress),
            "completed" => Ok(GoalStatus::Completed),
            other => anyhow::bail!("Unknown goal status '{}'", other),
        }
    }
}

/// Cadence at which periodic reminders fire for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
}

impl ReminderFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderFrequency::Weekly => "weekly",
            ReminderFrequency::Biweekly => "biweekly",
            ReminderFrequency::Monthly => "monthly",
            ReminderFrequency::Quarterly => "quarterly",
        }
    }
}

impl std::str::FromStr for ReminderFrequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "weekly" => Ok(ReminderFrequency::Weekly),
            "biweekly" => Ok(ReminderFrequency::Biweekly),
            "monthly" => Ok(ReminderFrequency::Monthly),
            "quarterly" => Ok(ReminderFrequency::Quarterly),
            other => anyhow::bail!("Unknown reminder frequency '{}'", other),
        }
    }
}

/// A goal owned by a single user.
///
/// `team_goal_ids` is an ordered set of foreign keys in memory; the
/// comma-joined TEXT form exists only at the storage boundary
/// (see `state::sqlite`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalGoal {
    pub user_id: String,
    pub goal_id: String,
    pub name: String,
    pub status: GoalStatus,
    /// Cycle start, `%Y-%m-%d`.
    pub start_date: String,
    /// Cycle end as the user entered it, `%Y-%m-%d`.
    pub end_date: String,
    /// Cycle end normalized to UTC, `%Y-%m-%d`. Drives all reminder and
    /// rollover date comparisons.
    pub end_date_utc: String,
    pub reminder_frequency: ReminderFrequency,
    /// True iff `team_goal_ids` is non-empty.
    pub is_aligned: bool,
    pub team_goal_ids: Vec<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub is_reminder_active: bool,
    /// Opaque token identifying the current cycle instance.
    pub goal_cycle_id: String,
    pub conversation_id: String,
    pub service_url: String,
}

impl PersonalGoal {
    /// Recompute the alignment flag from the team-goal-id set.
    pub fn sync_alignment(&mut self) {
        self.is_aligned = !self.team_goal_ids.is_empty();
    }
}

/// A goal owned by a team, delivered to a channel conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamGoal {
    pub team_id: String,
    pub goal_id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub end_date_utc: String,
    pub reminder_frequency: ReminderFrequency,
    pub is_active: bool,
    pub is_deleted: bool,
    pub is_reminder_active: bool,
    pub channel_conversation_id: String,
    pub goal_cycle_id: String,
    pub service_url: String,
}

/// A free-text note attached to a personal goal. Archived when the parent
/// goal's cycle rolls over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalGoalNote {
    pub user_id: String,
    pub note_id: String,
    pub personal_goal_id: String,
    pub description: String,
    pub source: String,
    pub created_at: String,
    pub is_active: bool,
}

/// Join an ordered team-goal-id set into the comma-separated storage form.
pub fn join_team_goal_ids(ids: &[String]) -> String {
    ids.join(",")
}

/// Parse the comma-separated storage form back into an ordered id set,
/// dropping empty segments left by legacy writers.
pub fn split_team_goal_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
