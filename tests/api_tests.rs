use axum_test::TestServer;
use serde_json::Value;

use session_recommender::{
    api::{create_router, AppState},
    models::{Enrollment, RawDataset, Session, Tag, User},
    services::{build_snapshot, snapshot_channel, HybridScorer, LevelPolicy, SnapshotPublisher},
};

fn conference() -> RawDataset {
    RawDataset {
        users: vec![
            User::new(1).with_job("engineer").with_years(5.0).with_interests("ml"),
            User::new(2).with_job("engineer").with_years(6.0).with_interests("ml"),
            User::new(3).with_job("chef").with_years(2.0).with_interests("baking"),
        ],
        sessions: vec![
            Session { session_id: 10 },
            Session { session_id: 20 },
            Session { session_id: 30 },
        ],
        enrollments: vec![Enrollment::new(1, 10), Enrollment::new(2, 10)],
        tags: vec![Tag::field(10, "ml"), Tag::field(20, "ml"), Tag::field(30, "cooking")],
    }
}

fn create_test_server() -> (TestServer, SnapshotPublisher) {
    let (publisher, snapshots) = snapshot_channel();
    let state = AppState::new(snapshots, HybridScorer::default());
    let app = create_router(state);
    (TestServer::new(app).unwrap(), publisher)
}

fn publish_conference(publisher: &SnapshotPublisher) {
    let snapshot = build_snapshot(&conference(), &LevelPolicy::default()).unwrap();
    publisher.publish(snapshot);
}

#[tokio::test]
async fn test_health_check() {
    let (server, _publisher) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_recommend_before_first_snapshot() {
    let (server, _publisher) = create_test_server();

    let response = server.get("/recommend").add_query_param("user_id", 1).await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("snapshot"));
}

#[tokio::test]
async fn test_recommend_excludes_enrolled_sessions() {
    let (server, publisher) = create_test_server();
    publish_conference(&publisher);

    let response = server
        .get("/recommend")
        .add_query_param("user_id", 2)
        .add_query_param("top_n", 2)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user_id"], 2);
    assert_eq!(body["recommended_sessions"], serde_json::json!([20, 30]));
}

#[tokio::test]
async fn test_recommend_cold_start_user() {
    let (server, publisher) = create_test_server();
    publish_conference(&publisher);

    let response = server.get("/recommend").add_query_param("user_id", 999).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommended_sessions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_recommend_rejects_zero_top_n() {
    let (server, publisher) = create_test_server();
    publish_conference(&publisher);

    let response = server
        .get("/recommend")
        .add_query_param("user_id", 1)
        .add_query_param("top_n", 0)
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_requires_user_id() {
    let (server, publisher) = create_test_server();
    publish_conference(&publisher);

    let response = server.get("/recommend").await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_snapshot_status() {
    let (server, publisher) = create_test_server();
    server
        .get("/snapshot")
        .await
        .assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    publish_conference(&publisher);
    let response = server.get("/snapshot").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user_count"], 3);
    assert_eq!(body["session_count"], 3);
    assert_eq!(body["enrollment_count"], 2);
    assert!(body["built_at"].is_string());
}

#[tokio::test]
async fn test_request_id_echoed() {
    let (server, _publisher) = create_test_server();
    let id = "8f14e45f-ceea-467f-a0e5-1a2b3c4d5e6f";

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id);
}
