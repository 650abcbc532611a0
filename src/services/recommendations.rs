use crate::{
    error::{AppError, AppResult},
    models::{SessionId, UserId},
    services::{HybridScorer, SnapshotReader},
};

/// Generates session recommendations for one user
///
/// Scores against whichever snapshot is published at call time. The
/// caller resolves the returned ids to display details.
///
/// `top_n` falls back to the scorer's configured default and must be at
/// least 1. Fails with `SnapshotUnavailable` until the first refresh
/// cycle has succeeded.
pub fn get_recommendations(
    snapshots: &SnapshotReader,
    scorer: &HybridScorer,
    user_id: UserId,
    top_n: Option<usize>,
) -> AppResult<Vec<SessionId>> {
    let top_n = top_n.unwrap_or(scorer.config().top_n);
    if top_n == 0 {
        return Err(AppError::InvalidInput("top_n must be at least 1".to_string()));
    }

    let snapshot = snapshots.require()?;
    Ok(scorer.recommend(&snapshot, user_id, top_n))
}
