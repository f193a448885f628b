use async_trait::async_trait;
use sqlx::Row;

use super::SqliteGoalStore;
use crate::traits::NoteStore;
use crate::types::PersonalGoalNote;

#[async_trait]
impl NoteStore for SqliteGoalStore {
    async fn archive_notes_for_goal(
        &self,
        user_id: &str,
        personal_goal_id: &str,
    ) -> anyhow::Result<usize> {
        let result = sqlx::query(
            "UPDATE personal_goal_notes SET is_active = 0
             WHERE user_id = ? AND personal_goal_id = ? AND is_active = 1",
        )
        .bind(user_id)
        .bind(personal_goal_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as usize)
    }

    async fn notes_for_goal(
        &self,
        user_id: &str,
        personal_goal_id: &str,
    ) -> anyhow::Result<Vec<PersonalGoalNote>> {
        let rows = sqlx::query(
            "SELECT user_id, note_id, personal_goal_id, description, source, created_at, is_active
             FROM personal_goal_notes
             WHERE user_id = ? AND personal_goal_id = ?
             ORDER BY created_at, note_id",
        )
        .bind(user_id)
        .bind(personal_goal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PersonalGoalNote {
                user_id: row.get("user_id"),
                note_id: row.get("note_id"),
                personal_goal_id: row.get("personal_goal_id"),
                description: row.get("description"),
                source: row.get("source"),
                created_at: row.get("created_at"),
                is_active: row.get::<i64, _>("is_active") != 0,
            })
            .collect())
    }

    async fn upsert_note(&self, note: &PersonalGoalNote) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO personal_goal_notes (
                user_id, note_id, personal_goal_id, description, source, created_at, is_active
             )
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id, note_id) DO UPDATE SET
               personal_goal_id = excluded.personal_goal_id,
               description = excluded.description,
               source = excluded.source,
               is_active = excluded.is_active",
        )
        .bind(&note.user_id)
        .bind(&note.note_id)
        .bind(&note.personal_goal_id)
        .bind(&note.description)
        .bind(&note.source)
        .bind(&note.created_at)
        .bind(note.is_active as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
