use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use super::SqliteGoalStore;
use crate::traits::TeamGoalStore;
use crate::types::TeamGoal;

const TEAM_GOAL_COLUMNS: &str = "team_id, goal_id, name, start_date, end_date, end_date_utc, \
     reminder_frequency, is_active, is_deleted, is_reminder_active, channel_conversation_id, \
     goal_cycle_id, service_url";

pub(super) fn team_goal_from_row(row: &SqliteRow) -> anyhow::Result<TeamGoal> {
    let frequency: String = row.get("reminder_frequency");

    Ok(TeamGoal {
        team_id: row.get("team_id"),
        goal_id: row.get("goal_id"),
        name: row.get("name"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        end_date_utc: row.get("end_date_utc"),
        reminder_frequency: frequency.parse()?,
        is_active: row.get::<i64, _>("is_active") != 0,
        is_deleted: row.get::<i64, _>("is_deleted") != 0,
        is_reminder_active: row.get::<i64, _>("is_reminder_active") != 0,
        channel_conversation_id: row.get("channel_conversation_id"),
        goal_cycle_id: row.get("goal_cycle_id"),
        service_url: row.get("service_url"),
    })
}

fn map_rows(rows: Vec<SqliteRow>) -> Vec<TeamGoal> {
    let mut goals = Vec::with_capacity(rows.len());
    for row in &rows {
        match team_goal_from_row(row) {
            Ok(goal) => goals.push(goal),
            Err(e) => {
                let team_id: String = row.get("team_id");
                let goal_id: String = row.get("goal_id");
                warn!(team_id, goal_id, "Skipping malformed team goal row: {}", e);
            }
        }
    }
    goals
}

#[async_trait]
impl TeamGoalStore for SqliteGoalStore {
    async fn team_goals_for_reminder(&self) -> anyhow::Result<Vec<TeamGoal>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM team_goals
             WHERE is_active = 1 AND is_deleted = 0 AND is_reminder_active = 1
             ORDER BY team_id, goal_id",
            TEAM_GOAL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(rows))
    }

    async fn get_team_goal(
        &self,
        team_id: &str,
        goal_id: &str,
    ) -> anyhow::Result<Option<TeamGoal>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM team_goals WHERE team_id = ? AND goal_id = ?",
            TEAM_GOAL_COLUMNS
        ))
        .bind(team_id)
        .bind(goal_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(team_goal_from_row).transpose()
    }

    async fn upsert_team_goal(&self, goal: &TeamGoal) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO team_goals (
                team_id, goal_id, name, start_date, end_date, end_date_utc,
                reminder_frequency, is_active, is_deleted, is_reminder_active,
                channel_conversation_id, goal_cycle_id, service_url
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(team_id, goal_id) DO UPDATE SET
               name = excluded.name,
               start_date = excluded.start_date,
               end_date = excluded.end_date,
               end_date_utc = excluded.end_date_utc,
               reminder_frequency = excluded.reminder_frequency,
               is_active = excluded.is_active,
               is_deleted = excluded.is_deleted,
               is_reminder_active = excluded.is_reminder_active,
               channel_conversation_id = excluded.channel_conversation_id,
               goal_cycle_id = excluded.goal_cycle_id,
               service_url = excluded.service_url",
        )
        .bind(&goal.team_id)
        .bind(&goal.goal_id)
        .bind(&goal.name)
        .bind(&goal.start_date)
        .bind(&goal.end_date)
        .bind(&goal.end_date_utc)
        .bind(goal.reminder_frequency.as_str())
        .bind(goal.is_active as i64)
        .bind(goal.is_deleted as i64)
        .bind(goal.is_reminder_active as i64)
        .bind(&goal.channel_conversation_id)
        .bind(&goal.goal_cycle_id)
        .bind(&goal.service_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn deleted_team_goals(&self) -> anyhow::Result<Vec<TeamGoal>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM team_goals WHERE is_deleted = 1 ORDER BY team_id, goal_id",
            TEAM_GOAL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(map_rows(rows))
    }

    async fn delete_team_goals(&self, goals: &[TeamGoal]) -> anyhow::Result<usize> {
        let mut removed = 0usize;
        for goal in goals {
            let result = sqlx::query("DELETE FROM team_goals WHERE team_id = ? AND goal_id = ?")
                .bind(&goal.team_id)
                .bind(&goal.goal_id)
                .execute(&self.pool)
                .await;

            match result {
                Ok(r) => removed += r.rows_affected() as usize,
                Err(e) => warn!(
                    team_id = %goal.team_id,
                    goal_id = %goal.goal_id,
                    "Failed to delete team goal: {}",
                    e
                ),
            }
        }
        Ok(removed)
    }
}
