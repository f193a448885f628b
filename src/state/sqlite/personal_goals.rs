use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use super::SqliteGoalStore;
use crate::traits::PersonalGoalStore;
use crate::types::{join_team_goal_ids, split_team_goal_ids, PersonalGoal};

const PERSONAL_GOAL_COLUMNS: &str = "user_id, goal_id, name, status, start_date, end_date, \
     end_date_utc, reminder_frequency, is_aligned, team_goal_ids, is_active, is_deleted, \
     is_reminder_active, goal_cycle_id, conversation_id, service_url";

pub(super) fn personal_goal_from_row(row: &SqliteRow) -> anyhow::Result<PersonalGoal> {
    let status: String = row.get("status");
    let frequency: String = row.get("reminder_frequency");
    let team_goal_ids: String = row.get("team_goal_ids");

    Ok(PersonalGoal {
        user_id: row.get("user_id"),
        goal_id: row.get("goal_id"),
        name: row.get("name"),
        status: status.parse()?,
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        end_date_utc: row.get("end_date_utc"),
        reminder_frequency: frequency.parse()?,
        is_aligned: row.get::<i64, _>("is_aligned") != 0,
        team_goal_ids: split_team_goal_ids(&team_goal_ids),
        is_active: row.get::<i64, _>("is_active") != 0,
        is_deleted: row.get::<i64, _>("is_deleted") != 0,
        is_reminder_active: row.get::<i64, _>("is_reminder_active") != 0,
        goal_cycle_id: row.get("goal_cycle_id"),
        conversation_id: row.get("conversation_id"),
        service_url: row.get("service_url"),
    })
}

/// Map a batch of rows, skipping records with malformed enum columns so one
/// bad row cannot take down an entire reminder run.
fn map_rows(rows: Vec<SqliteRow>) -> Vec<PersonalGoal> {
    let mut goals = Vec::with_capacity(rows.len());
    for row in &rows {
        match personal_goal_from_row(row) {
            Ok(goal) => goals.push(goal),
            Err(e) => {
                let user_id: String = row.get("user_id");
                let goal_id: String = row.get("goal_id");
                warn!(user_id, goal_id, "Skipping malformed personal goal row: {}", e);
            }
        }
    }
    goals
}

#[async_trait]
impl PersonalGoalStore for SqliteGoalStore {
    async fn personal_goals_for_reminder(&self) -> anyhow::Result<Vec<PersonalGoal>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM personal_goals
             WHERE is_active = 1 AND is_deleted = 0 AND is_reminder_active = 1
               AND is_aligned = 0
             ORDER BY user_id, goal_id",
            PERSONAL_GOAL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(rows))
    }

    async fn personal_goals_aligned_to(
        &self,
        team_goal_id: &str,
    ) -> anyhow::Result<Vec<PersonalGoal>> {
        // Membership test against the comma-joined set, with sentinel commas
        // so "tg-1" does not match "tg-10".
        let rows = sqlx::query(&format!(
            "SELECT {} FROM personal_goals
             WHERE is_deleted = 0
               AND (',' || team_goal_ids || ',') LIKE ('%,' || ? || ',%')
             ORDER BY user_id, goal_id",
            PERSONAL_GOAL_COLUMNS
        ))
        .bind(team_goal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(rows))
    }

    async fn get_personal_goal(
        &self,
        user_id: &str,
        goal_id: &str,
    ) -> anyhow::Result<Option<PersonalGoal>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM personal_goals WHERE user_id = ? AND goal_id = ?",
            PERSONAL_GOAL_COLUMNS
        ))
        .bind(user_id)
        .bind(goal_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(personal_goal_from_row).transpose()
    }

    async fn upsert_personal_goal(&self, goal: &PersonalGoal) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO personal_goals (
                user_id, goal_id, name, status, start_date, end_date, end_date_utc,
                reminder_frequency, is_aligned, team_goal_ids, is_active, is_deleted,
                is_reminder_active, goal_cycle_id, conversation_id, service_url
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id, goal_id) DO UPDATE SET
               name = excluded.name,
               status = excluded.status,
               start_date = excluded.start_date,
               end_date = excluded.end_date,
               end_date_utc = excluded.end_date_utc,
               reminder_frequency = excluded.reminder_frequency,
               is_aligned = excluded.is_aligned,
               team_goal_ids = excluded.team_goal_ids,
               is_active = excluded.is_active,
               is_deleted = excluded.is_deleted,
               is_reminder_active = excluded.is_reminder_active,
               goal_cycle_id = excluded.goal_cycle_id,
               conversation_id = excluded.conversation_id,
               service_url = excluded.service_url",
        )
        .bind(&goal.user_id)
        .bind(&goal.goal_id)
        .bind(&goal.name)
        .bind(goal.status.as_str())
        .bind(&goal.start_date)
        .bind(&goal.end_date)
        .bind(&goal.end_date_utc)
        .bind(goal.reminder_frequency.as_str())
        .bind(goal.is_aligned as i64)
        .bind(join_team_goal_ids(&goal.team_goal_ids))
        .bind(goal.is_active as i64)
        .bind(goal.is_deleted as i64)
        .bind(goal.is_reminder_active as i64)
        .bind(&goal.goal_cycle_id)
        .bind(&goal.conversation_id)
        .bind(&goal.service_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn deleted_personal_goals(&self) -> anyhow::Result<Vec<PersonalGoal>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM personal_goals WHERE is_deleted = 1 ORDER BY user_id, goal_id",
            PERSONAL_GOAL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(rows))
    }

    async fn delete_personal_goals(&self, goals: &[PersonalGoal]) -> anyhow::Result<usize> {
        let mut removed = 0usize;
        for goal in goals {
            let result = sqlx::query(
                "DELETE FROM personal_goals WHERE user_id = ? AND goal_id = ?",
            )
            .bind(&goal.user_id)
            .bind(&goal.goal_id)
            .execute(&self.pool)
            .await;

            match result {
                Ok(r) => removed += r.rows_affected() as usize,
                Err(e) => warn!(
                    user_id = %goal.user_id,
                    goal_id = %goal.goal_id,
                    "Failed to delete personal goal: {}",
                    e
                ),
            }
        }
        Ok(removed)
    }
}
