use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    db::DataSource,
    error::{AppError, AppResult},
    models::{RawDataset, Snapshot},
};

use super::{
    build_user_item_matrix, cosine_pairwise,
    features::{build_session_features, build_user_features, tagged_session_count, LevelPolicy},
    store::SnapshotPublisher,
};

/// Runs the whole pipeline on one dataset: features, both similarity
/// matrices and the enrollment matrix.
pub fn build_snapshot(dataset: &RawDataset, policy: &LevelPolicy) -> AppResult<Snapshot> {
    let user_features = build_user_features(&dataset.users)?;
    let session_features = build_session_features(&dataset.sessions, &dataset.tags, policy)?;

    let user_items = build_user_item_matrix(
        &dataset.enrollments,
        user_features.ids.ids(),
        session_features.ids.ids(),
    );
    let user_similarity = cosine_pairwise(&user_features.combined(), user_features.ids)?;
    let session_similarity = cosine_pairwise(&session_features.text, session_features.ids)?;

    Snapshot::new(user_similarity, session_similarity, user_items, Utc::now())
}

/// Periodically rebuilds the snapshot and publishes it.
///
/// Cycles run one after another on a single task, so they never overlap.
/// A failed cycle leaves the previously published snapshot in place.
pub struct SnapshotRefresher {
    source: Arc<dyn DataSource>,
    publisher: SnapshotPublisher,
    policy: LevelPolicy,
}

impl SnapshotRefresher {
    pub fn new(source: Arc<dyn DataSource>, publisher: SnapshotPublisher, policy: LevelPolicy) -> Self {
        Self {
            source,
            publisher,
            policy,
        }
    }

    /// Loads, builds and publishes one snapshot
    pub async fn refresh_once(&self) -> AppResult<Arc<Snapshot>> {
        let started = Instant::now();
        tracing::debug!(source = self.source.name(), "Snapshot refresh started");

        let dataset = self.source.load().await?;
        tracing::debug!(
            users = dataset.users.len(),
            sessions = dataset.sessions.len(),
            enrollments = dataset.enrollments.len(),
            tagged_sessions = tagged_session_count(&dataset.tags),
            "Dataset loaded"
        );

        let policy = self.policy.clone();
        let snapshot = tokio::task::spawn_blocking(move || build_snapshot(&dataset, &policy))
            .await
            .map_err(|e| AppError::Internal(format!("snapshot build task failed: {}", e)))??;

        let published = self.publisher.publish(snapshot);
        let summary = published.summary();
        tracing::info!(
            users = summary.user_count,
            sessions = summary.session_count,
            enrollments = summary.enrollment_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Snapshot refresh completed"
        );

        Ok(published)
    }

    /// Refreshes immediately, then once per `period`, for as long as the task lives.
    /// A cycle slower than `period` delays the next one instead of overlapping it.
    pub async fn run(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = self.refresh_once().await {
                tracing::error!(
                    error = %e,
                    source = self.source.name(),
                    "Snapshot refresh failed, keeping previous snapshot"
                );
            }
        }
    }

    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tracing::info!(period_secs = period.as_secs(), "Starting snapshot refresher");
        tokio::spawn(self.run(period))
    }
}
