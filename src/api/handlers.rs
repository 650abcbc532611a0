use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{SessionId, SnapshotSummary, UserId},
    services::recommendations,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub user_id: UserId,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub user_id: UserId,
    pub recommended_sessions: Vec<SessionId>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Ranked session ids for one user
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> AppResult<Json<RecommendResponse>> {
    let recommended_sessions = recommendations::get_recommendations(
        &state.snapshots,
        &state.scorer,
        params.user_id,
        params.top_n,
    )?;

    Ok(Json(RecommendResponse {
        user_id: params.user_id,
        recommended_sessions,
    }))
}

/// Describes the currently published snapshot
pub async fn snapshot_status(State(state): State<AppState>) -> AppResult<Json<SnapshotSummary>> {
    let snapshot = state.snapshots.require()?;
    Ok(Json(snapshot.summary()))
}
