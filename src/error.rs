use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Feature build error: {0}")]
    FeatureBuild(String),

    /// The matrices of a snapshot disagree on their id universes
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("No recommendation snapshot has been published yet")]
    SnapshotUnavailable,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::SnapshotUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Database(_)
            | AppError::DataLoad(_)
            | AppError::FeatureBuild(_)
            | AppError::InvalidSnapshot(_)
            | AppError::Config(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let response = AppError::InvalidInput("top_n must be positive".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_snapshot_maps_to_service_unavailable() {
        let response = AppError::SnapshotUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_build_failures_are_internal() {
        let response = AppError::FeatureBuild("no sessions".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
