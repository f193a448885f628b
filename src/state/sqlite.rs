use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::traits::GoalStore;

mod migrations;
mod notes;
mod personal_goals;
mod team_goals;

#[cfg(test)]
mod tests;

/// SQLite-backed goal storage.
///
/// Booleans are stored as INTEGER 0/1, dates as `%Y-%m-%d` TEXT, and the
/// team-goal-id set as comma-joined TEXT; the in-memory `Vec<String>` form
/// exists only on either side of the row mapping here.
pub struct SqliteGoalStore {
    pool: SqlitePool,
}

impl SqliteGoalStore {
    pub async fn new(db_path: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        migrations::migrate(&pool).await?;

        Ok(Self { pool })
    }
}

impl GoalStore for SqliteGoalStore {}
