//! Weekly retention jobs: hard-delete goals that were soft-deleted through
//! the interactive surface.

use std::sync::Arc;

use tracing::info;

use crate::traits::{GoalStore, PersonalGoalStore, TeamGoalStore};

/// Purge soft-deleted personal goals. Returns the number removed.
pub async fn purge_personal_goals(store: &Arc<dyn GoalStore>) -> anyhow::Result<usize> {
    let doomed = store.deleted_personal_goals().await?;
    if doomed.is_empty() {
        info!("No soft-deleted personal goals to purge");
        return Ok(0);
    }

    let removed = store.delete_personal_goals(&doomed).await?;
    info!(
        candidates = doomed.len(),
        removed, "Personal goal purge complete"
    );
    Ok(removed)
}

/// Purge soft-deleted team goals. Returns the number removed.
pub async fn purge_team_goals(store: &Arc<dyn GoalStore>) -> anyhow::Result<usize> {
    let doomed = store.deleted_team_goals().await?;
    if doomed.is_empty() {
        info!("No soft-deleted team goals to purge");
        return Ok(0);
    }

    let removed = store.delete_team_goals(&doomed).await?;
    info!(
        candidates = doomed.len(),
        removed, "Team goal purge complete"
    );
    Ok(removed)
}
