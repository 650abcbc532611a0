use std::sync::Arc;

use crate::services::{HybridScorer, SnapshotReader};

/// Shared application state
///
/// Handlers only read: the snapshot slot is written by the refresher task
/// and the scorer is immutable.
#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotReader,
    pub scorer: Arc<HybridScorer>,
}

impl AppState {
    pub fn new(snapshots: SnapshotReader, scorer: HybridScorer) -> Self {
        Self {
            snapshots,
            scorer: Arc::new(scorer),
        }
    }
}
