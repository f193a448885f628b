use super::SqliteGoalStore;
use crate::testing::{aligned_personal_goal, note, personal_goal, team_goal};
use crate::traits::{NoteStore, PersonalGoalStore, TeamGoalStore};

async fn store(dir: &tempfile::TempDir) -> SqliteGoalStore {
    let path = dir.path().join("goals.db");
    SqliteGoalStore::new(path.to_str().unwrap()).await.unwrap()
}

#[tokio::test]
async fn test_personal_goal_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir).await;

    let mut goal = personal_goal("user-1", "goal-1");
    goal.team_goal_ids = vec!["tg-1".to_string(), "tg-2".to_string()];
    goal.sync_alignment();
    store.upsert_personal_goal(&goal).await.unwrap();

    let loaded = store
        .get_personal_goal("user-1", "goal-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.name, goal.name);
    assert_eq!(loaded.status, goal.status);
    assert_eq!(loaded.team_goal_ids, goal.team_goal_ids);
    assert!(loaded.is_aligned);
    assert_eq!(loaded.goal_cycle_id, goal.goal_cycle_id);

    // Upsert overwrites in place.
    let mut updated = loaded.clone();
    updated.name = "Renamed".to_string();
    store.upsert_personal_goal(&updated).await.unwrap();
    let reloaded = store
        .get_personal_goal("user-1", "goal-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.name, "Renamed");
}

#[tokio::test]
async fn test_reminder_query_filters_ineligible_goals() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir).await;

    store
        .upsert_personal_goal(&personal_goal("user-1", "goal-eligible"))
        .await
        .unwrap();

    let mut aligned = aligned_personal_goal("user-2", "goal-aligned", "tg-1");
    aligned.sync_alignment();
    store.upsert_personal_goal(&aligned).await.unwrap();

    let mut deleted = personal_goal("user-3", "goal-deleted");
    deleted.is_deleted = true;
    store.upsert_personal_goal(&deleted).await.unwrap();

    let mut muted = personal_goal("user-4", "goal-muted");
    muted.is_reminder_active = false;
    store.upsert_personal_goal(&muted).await.unwrap();

    let mut inactive = personal_goal("user-5", "goal-inactive");
    inactive.is_active = false;
    store.upsert_personal_goal(&inactive).await.unwrap();

    let eligible = store.personal_goals_for_reminder().await.unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].goal_id, "goal-eligible");
}

#[tokio::test]
async fn test_aligned_lookup_matches_exact_ids_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir).await;

    let mut multi = aligned_personal_goal("user-1", "goal-1", "tg-1");
    multi.team_goal_ids.push("tg-2".to_string());
    store.upsert_personal_goal(&multi).await.unwrap();

    // "tg-1" must not match a goal aligned only to "tg-10".
    store
        .upsert_personal_goal(&aligned_personal_goal("user-2", "goal-2", "tg-10"))
        .await
        .unwrap();

    let aligned = store.personal_goals_aligned_to("tg-1").await.unwrap();
    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned[0].user_id, "user-1");

    let aligned = store.personal_goals_aligned_to("tg-2").await.unwrap();
    assert_eq!(aligned.len(), 1);

    let aligned = store.personal_goals_aligned_to("tg-10").await.unwrap();
    assert_eq!(aligned[0].user_id, "user-2");
}

#[tokio::test]
async fn test_deleted_goal_purge_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir).await;

    for id in ["goal-1", "goal-2", "goal-3"] {
        let mut goal = personal_goal("user-1", id);
        goal.is_deleted = true;
        store.upsert_personal_goal(&goal).await.unwrap();
    }
    store
        .upsert_personal_goal(&personal_goal("user-1", "goal-keep"))
        .await
        .unwrap();

    let doomed = store.deleted_personal_goals().await.unwrap();
    assert_eq!(doomed.len(), 3);

    let removed = store.delete_personal_goals(&doomed).await.unwrap();
    assert_eq!(removed, 3);
    assert!(store.deleted_personal_goals().await.unwrap().is_empty());
    assert!(store
        .get_personal_goal("user-1", "goal-keep")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_team_goal_round_trip_and_purge() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir).await;

    let goal = team_goal("team-1", "tg-1");
    store.upsert_team_goal(&goal).await.unwrap();

    let loaded = store.get_team_goal("team-1", "tg-1").await.unwrap().unwrap();
    assert_eq!(loaded.name, goal.name);
    assert_eq!(loaded.reminder_frequency, goal.reminder_frequency);

    let eligible = store.team_goals_for_reminder().await.unwrap();
    assert_eq!(eligible.len(), 1);

    let mut doomed = loaded;
    doomed.is_deleted = true;
    store.upsert_team_goal(&doomed).await.unwrap();
    assert!(store.team_goals_for_reminder().await.unwrap().is_empty());

    let removed = store
        .delete_team_goals(&store.deleted_team_goals().await.unwrap())
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(store.get_team_goal("team-1", "tg-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_note_archive() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir).await;

    store.upsert_note(&note("user-1", "note-1", "goal-1")).await.unwrap();
    store.upsert_note(&note("user-1", "note-2", "goal-1")).await.unwrap();
    store.upsert_note(&note("user-1", "note-3", "goal-other")).await.unwrap();

    let archived = store.archive_notes_for_goal("user-1", "goal-1").await.unwrap();
    assert_eq!(archived, 2);

    let notes = store.notes_for_goal("user-1", "goal-1").await.unwrap();
    assert!(notes.iter().all(|n| !n.is_active));

    let other = store.notes_for_goal("user-1", "goal-other").await.unwrap();
    assert!(other[0].is_active);

    // Archiving again touches nothing.
    let archived = store.archive_notes_for_goal("user-1", "goal-1").await.unwrap();
    assert_eq!(archived, 0);
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goals.db");
    let first = SqliteGoalStore::new(path.to_str().unwrap()).await.unwrap();
    first
        .upsert_personal_goal(&personal_goal("user-1", "goal-1"))
        .await
        .unwrap();
    drop(first);

    // Reopening re-runs the migrations against existing tables.
    let second = SqliteGoalStore::new(path.to_str().unwrap()).await.unwrap();
    assert!(second
        .get_personal_goal("user-1", "goal-1")
        .await
        .unwrap()
        .is_some());
}
