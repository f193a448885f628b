use sqlx::SqlitePool;
use tracing::info;

/// Idempotent schema setup for all goal tables. Safe to call on every start
/// by using `IF NOT EXISTS` throughout.
pub(crate) async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS personal_goals (
            user_id TEXT NOT NULL,
            goal_id TEXT NOT NULL,
            name TEXT NOT NULL,
            status TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            end_date_utc TEXT NOT NULL,
            reminder_frequency TEXT NOT NULL,
            is_aligned INTEGER NOT NULL DEFAULT 0,
            team_goal_ids TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_reminder_active INTEGER NOT NULL DEFAULT 1,
            goal_cycle_id TEXT NOT NULL,
            conversation_id TEXT NOT NULL DEFAULT '',
            service_url TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (user_id, goal_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Reminder scan touches only eligible rows.
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_personal_goals_reminder
         ON personal_goals(user_id, goal_id)
         WHERE is_active = 1 AND is_deleted = 0 AND is_reminder_active = 1",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_personal_goals_deleted
         ON personal_goals(user_id) WHERE is_deleted = 1",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS team_goals (
            team_id TEXT NOT NULL,
            goal_id TEXT NOT NULL,
            name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            end_date_utc TEXT NOT NULL,
            reminder_frequency TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_reminder_active INTEGER NOT NULL DEFAULT 1,
            channel_conversation_id TEXT NOT NULL DEFAULT '',
            goal_cycle_id TEXT NOT NULL,
            service_url TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (team_id, goal_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_team_goals_deleted
         ON team_goals(team_id) WHERE is_deleted = 1",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS personal_goal_notes (
            user_id TEXT NOT NULL,
            note_id TEXT NOT NULL,
            personal_goal_id TEXT NOT NULL,
            description TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (user_id, note_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_notes_goal
         ON personal_goal_notes(user_id, personal_goal_id)",
    )
    .execute(pool)
    .await?;

    info!("Goal store migration complete");
    Ok(())
}
