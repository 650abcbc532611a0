use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{SimilarityMatrix, UserItemMatrix};
use crate::error::{AppError, AppResult};

/// One consistent view of the recommendation data as of a refresh cycle.
///
/// Immutable once built. Besides the three matrices it carries the
/// alignment tables from enrollment-matrix positions to similarity-matrix
/// positions so the scorer never looks ids up twice.
#[derive(Debug, Clone)]
pub struct Snapshot {
    user_similarity: SimilarityMatrix,
    session_similarity: SimilarityMatrix,
    user_items: UserItemMatrix,
    /// For each user-item row, its row in `user_similarity`
    user_alignment: Vec<Option<usize>>,
    /// For each user-item column, its row in `session_similarity`
    session_alignment: Vec<Option<usize>>,
    built_at: DateTime<Utc>,
}

/// Counts describing a published snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub built_at: DateTime<Utc>,
    pub user_count: usize,
    pub session_count: usize,
    pub enrollment_count: usize,
}

impl Snapshot {
    /// Bundles the matrices, checking that the enrollment matrix covers
    /// every id either similarity matrix knows about.
    pub fn new(
        user_similarity: SimilarityMatrix,
        session_similarity: SimilarityMatrix,
        user_items: UserItemMatrix,
        built_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if let Some(missing) = user_similarity
            .index()
            .ids()
            .iter()
            .find(|id| !user_items.users().contains(**id))
        {
            return Err(AppError::InvalidSnapshot(format!(
                "user {} has similarities but no enrollment row",
                missing
            )));
        }
        if let Some(missing) = session_similarity
            .index()
            .ids()
            .iter()
            .find(|id| !user_items.sessions().contains(**id))
        {
            return Err(AppError::InvalidSnapshot(format!(
                "session {} has similarities but no enrollment column",
                missing
            )));
        }

        let user_alignment = user_items
            .users()
            .ids()
            .iter()
            .map(|&id| user_similarity.index().position(id))
            .collect();
        let session_alignment = user_items
            .sessions()
            .ids()
            .iter()
            .map(|&id| session_similarity.index().position(id))
            .collect();

        Ok(Self {
            user_similarity,
            session_similarity,
            user_items,
            user_alignment,
            session_alignment,
            built_at,
        })
    }

    pub fn user_similarity(&self) -> &SimilarityMatrix {
        &self.user_similarity
    }

    pub fn session_similarity(&self) -> &SimilarityMatrix {
        &self.session_similarity
    }

    pub fn user_items(&self) -> &UserItemMatrix {
        &self.user_items
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub(crate) fn user_alignment(&self) -> &[Option<usize>] {
        &self.user_alignment
    }

    pub(crate) fn session_alignment(&self) -> &[Option<usize>] {
        &self.session_alignment
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            built_at: self.built_at,
            user_count: self.user_items.users().len(),
            session_count: self.user_items.sessions().len(),
            enrollment_count: self.user_items.enrollment_count(),
        }
    }
}
