//! Test infrastructure: in-memory goal store, recording notifier, and
//! record builders shared by the unit and integration tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::traits::{GoalStore, NoteStore, Notifier, PersonalGoalStore, TeamGoalStore};
use crate::types::{
    GoalStatus, PersonalGoal, PersonalGoalNote, ReminderFrequency, TeamGoal,
};

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// An unaligned, active, reminder-eligible personal goal with a January 2021
/// cycle. Tests override the fields they care about.
pub fn personal_goal(user_id: &str, goal_id: &str) -> PersonalGoal {
    PersonalGoal {
        user_id: user_id.to_string(),
        goal_id: goal_id.to_string(),
        name: format!("Goal {}", goal_id),
        status: GoalStatus::InProgress,
        start_date: "2021-01-01".to_string(),
        end_date: "2021-01-31".to_string(),
        end_date_utc: "2021-01-31".to_string(),
        reminder_frequency: ReminderFrequency::Weekly,
        is_aligned: false,
        team_goal_ids: Vec::new(),
        is_active: true,
        is_deleted: false,
        is_reminder_active: true,
        goal_cycle_id: uuid::Uuid::new_v4().to_string(),
        conversation_id: format!("conv-{}", user_id),
        service_url: "https://smba.trafficmanager.net/amer/".to_string(),
    }
}

/// A personal goal aligned to one team goal.
pub fn aligned_personal_goal(user_id: &str, goal_id: &str, team_goal_id: &str) -> PersonalGoal {
    let mut goal = personal_goal(user_id, goal_id);
    goal.team_goal_ids = vec![team_goal_id.to_string()];
    goal.is_aligned = true;
    goal
}

pub fn team_goal(team_id: &str, goal_id: &str) -> TeamGoal {
    TeamGoal {
        team_id: team_id.to_string(),
        goal_id: goal_id.to_string(),
        name: format!("Team goal {}", goal_id),
        start_date: "2021-01-01".to_string(),
        end_date: "2021-01-31".to_string(),
        end_date_utc: "2021-01-31".to_string(),
        reminder_frequency: ReminderFrequency::Weekly,
        is_active: true,
        is_deleted: false,
        is_reminder_active: true,
        channel_conversation_id: format!("channel-{}", team_id),
        goal_cycle_id: uuid::Uuid::new_v4().to_string(),
        service_url: "https://smba.trafficmanager.net/amer/".to_string(),
    }
}

pub fn note(user_id: &str, note_id: &str, personal_goal_id: &str) -> PersonalGoalNote {
    PersonalGoalNote {
        user_id: user_id.to_string(),
        note_id: note_id.to_string(),
        personal_goal_id: personal_goal_id.to_string(),
        description: format!("Note {}", note_id),
        source: "bot".to_string(),
        created_at: "2021-01-10".to_string(),
        is_active: true,
    }
}

// ---------------------------------------------------------------------------
// MemoryGoalStore
// ---------------------------------------------------------------------------

/// In-memory `GoalStore` backed by BTreeMaps so scan order matches the
/// SQLite store's (owner id, goal id) ordering.
#[derive(Default)]
pub struct MemoryGoalStore {
    personal: RwLock<BTreeMap<(String, String), PersonalGoal>>,
    team: RwLock<BTreeMap<(String, String), TeamGoal>>,
    notes: RwLock<BTreeMap<(String, String), PersonalGoalNote>>,
}

impl MemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonalGoalStore for MemoryGoalStore {
    async fn personal_goals_for_reminder(&self) -> anyhow::Result<Vec<PersonalGoal>> {
        let personal = self.personal.read().await;
        Ok(personal
            .values()
            .filter(|g| g.is_active && !g.is_deleted && g.is_reminder_active && !g.is_aligned)
            .cloned()
            .collect())
    }

    async fn personal_goals_aligned_to(
        &self,
        team_goal_id: &str,
    ) -> anyhow::Result<Vec<PersonalGoal>> {
        let personal = self.personal.read().await;
        Ok(personal
            .values()
            .filter(|g| !g.is_deleted && g.team_goal_ids.iter().any(|id| id == team_goal_id))
            .cloned()
            .collect())
    }

    async fn get_personal_goal(
        &self,
        user_id: &str,
        goal_id: &str,
    ) -> anyhow::Result<Option<PersonalGoal>> {
        let personal = self.personal.read().await;
        Ok(personal
            .get(&(user_id.to_string(), goal_id.to_string()))
            .cloned())
    }

    async fn upsert_personal_goal(&self, goal: &PersonalGoal) -> anyhow::Result<()> {
        let mut personal = self.personal.write().await;
        personal.insert(
            (goal.user_id.clone(), goal.goal_id.clone()),
            goal.clone(),
        );
        Ok(())
    }

    async fn deleted_personal_goals(&self) -> anyhow::Result<Vec<PersonalGoal>> {
        let personal = self.personal.read().await;
        Ok(personal.values().filter(|g| g.is_deleted).cloned().collect())
    }

    async fn delete_personal_goals(&self, goals: &[PersonalGoal]) -> anyhow::Result<usize> {
        let mut personal = self.personal.write().await;
        let mut removed = 0;
        for goal in goals {
            if personal
                .remove(&(goal.user_id.clone(), goal.goal_id.clone()))
                .is_some()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl TeamGoalStore for MemoryGoalStore {
    async fn team_goals_for_reminder(&self) -> anyhow::Result<Vec<TeamGoal>> {
        let team = self.team.read().await;
        Ok(team
            .values()
            .filter(|g| g.is_active && !g.is_deleted && g.is_reminder_active)
            .cloned()
            .collect())
    }

    async fn get_team_goal(
        &self,
        team_id: &str,
        goal_id: &str,
    ) -> anyhow::Result<Option<TeamGoal>> {
        let team = self.team.read().await;
        Ok(team.get(&(team_id.to_string(), goal_id.to_string())).cloned())
    }

    async fn upsert_team_goal(&self, goal: &TeamGoal) -> anyhow::Result<()> {
        let mut team = self.team.write().await;
        team.insert((goal.team_id.clone(), goal.goal_id.clone()), goal.clone());
        Ok(())
    }

    async fn deleted_team_goals(&self) -> anyhow::Result<Vec<TeamGoal>> {
        let team = self.team.read().await;
        Ok(team.values().filter(|g| g.is_deleted).cloned().collect())
    }

    async fn delete_team_goals(&self, goals: &[TeamGoal]) -> anyhow::Result<usize> {
        let mut team = self.team.write().await;
        let mut removed = 0;
        for goal in goals {
            if team
                .remove(&(goal.team_id.clone(), goal.goal_id.clone()))
                .is_some()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl NoteStore for MemoryGoalStore {
    async fn archive_notes_for_goal(
        &self,
        user_id: &str,
        personal_goal_id: &str,
    ) -> anyhow::Result<usize> {
        let mut notes = self.notes.write().await;
        let mut archived = 0;
        for note in notes.values_mut() {
            if note.user_id == user_id
                && note.personal_goal_id == personal_goal_id
                && note.is_active
            {
                note.is_active = false;
                archived += 1;
            }
        }
        Ok(archived)
    }

    async fn notes_for_goal(
        &self,
        user_id: &str,
        personal_goal_id: &str,
    ) -> anyhow::Result<Vec<PersonalGoalNote>> {
        let notes = self.notes.read().await;
        Ok(notes
            .values()
            .filter(|n| n.user_id == user_id && n.personal_goal_id == personal_goal_id)
            .cloned()
            .collect())
    }

    async fn upsert_note(&self, note: &PersonalGoalNote) -> anyhow::Result<()> {
        let mut notes = self.notes.write().await;
        notes.insert((note.user_id.clone(), note.note_id.clone()), note.clone());
        Ok(())
    }
}

impl GoalStore for MemoryGoalStore {}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// One dispatched reminder, as observed by the recording notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReminder {
    pub owner_id: String,
    pub goal_id: String,
    pub is_team: bool,
    pub before_three_days: bool,
}

impl SentReminder {
    pub fn personal(owner_id: &str, goal_id: &str, before_three_days: bool) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            goal_id: goal_id.to_string(),
            is_team: false,
            before_three_days,
        }
    }

    pub fn team(owner_id: &str, goal_id: &str, before_three_days: bool) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            goal_id: goal_id.to_string(),
            is_team: true,
            before_three_days,
        }
    }
}

/// Notifier that records every send, optionally failing for one owner id to
/// exercise the best-effort delivery paths.
pub struct RecordingNotifier {
    sent: RwLock<Vec<SentReminder>>,
    fail_owner: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            fail_owner: None,
        }
    }

    /// Deliveries for `owner_id` fail; everything else is recorded.
    pub fn failing_for(owner_id: &str) -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            fail_owner: Some(owner_id.to_string()),
        }
    }

    pub async fn sent(&self) -> Vec<SentReminder> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_personal_reminder(
        &self,
        goal: &PersonalGoal,
        before_three_days: bool,
    ) -> anyhow::Result<()> {
        if self.fail_owner.as_deref() == Some(goal.user_id.as_str()) {
            anyhow::bail!("simulated delivery failure for {}", goal.user_id);
        }
        self.sent.write().await.push(SentReminder::personal(
            &goal.user_id,
            &goal.goal_id,
            before_three_days,
        ));
        Ok(())
    }

    async fn send_team_reminder(
        &self,
        goal: &TeamGoal,
        before_three_days: bool,
    ) -> anyhow::Result<()> {
        if self.fail_owner.as_deref() == Some(goal.team_id.as_str()) {
            anyhow::bail!("simulated delivery failure for {}", goal.team_id);
        }
        self.sent.write().await.push(SentReminder::team(
            &goal.team_id,
            &goal.goal_id,
            before_three_days,
        ));
        Ok(())
    }
}
