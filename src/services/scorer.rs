//! Hybrid session scoring.
//!
//! Three signals are fused per session:
//! - user-based: enrollments of the `k` most similar users, weighted by
//!   their similarity to the target and averaged;
//! - item-based: summed session similarities to every liked session;
//! - behavior propagation: enrollments of every user sharing a liked
//!   session, weighted by user similarity and averaged.
//!
//! Scoring reads an immutable [`Snapshot`] and has no side effects.

use serde::Serialize;

use crate::models::{SessionId, Snapshot, UserId};

/// Weights applied to the three signals before summing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub user: f64,
    pub item: f64,
    pub behavior: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            user: 0.5,
            item: 0.1,
            behavior: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Neighbors feeding the user-based signal
    pub neighbor_count: usize,
    /// Result size used when the caller does not choose one
    pub top_n: usize,
    pub weights: FusionWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            neighbor_count: 5,
            top_n: 5,
            weights: FusionWeights::default(),
        }
    }
}

/// A candidate session with its fused score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredSession {
    pub session_id: SessionId,
    pub score: f64,
}

/// Per-session signal vectors, aligned with the snapshot's session columns
#[derive(Debug, Clone, PartialEq)]
pub struct Signals {
    pub user_based: Vec<f64>,
    pub item_based: Vec<f64>,
    pub behavior: Vec<f64>,
    /// Column positions the target is enrolled in
    pub liked: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct HybridScorer {
    config: ScoringConfig,
}

impl HybridScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Up to `top_n` session ids, best first. Sessions the user is
    /// enrolled in are never returned. Unknown users are scored as
    /// cold-start users with no enrollments.
    pub fn recommend(&self, snapshot: &Snapshot, user_id: UserId, top_n: usize) -> Vec<SessionId> {
        self.rank(snapshot, user_id)
            .into_iter()
            .take(top_n)
            .map(|s| s.session_id)
            .collect()
    }

    /// Every eligible session with its fused score, best first.
    /// Equal scores are ordered by ascending session id.
    pub fn rank(&self, snapshot: &Snapshot, user_id: UserId) -> Vec<ScoredSession> {
        let signals = self.signals(snapshot, user_id);
        let weights = &self.config.weights;
        let sessions = snapshot.user_items().sessions();

        let mut liked = vec![false; sessions.len()];
        for &col in &signals.liked {
            liked[col] = true;
        }

        let mut ranked: Vec<ScoredSession> = (0..sessions.len())
            .filter(|&col| !liked[col])
            .map(|col| ScoredSession {
                session_id: sessions.id_at(col),
                score: weights.user * signals.user_based[col]
                    + weights.item * signals.item_based[col]
                    + weights.behavior * signals.behavior[col],
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        ranked
    }

    /// The three unweighted signal vectors for `user_id`
    pub fn signals(&self, snapshot: &Snapshot, user_id: UserId) -> Signals {
        let items = snapshot.user_items();
        let n_sessions = items.sessions().len();
        let cold_row = vec![0u8; n_sessions];
        let target_row = items.row(user_id).unwrap_or(cold_row.as_slice());

        let liked: Vec<usize> = (0..n_sessions).filter(|&col| target_row[col] == 1).collect();

        Signals {
            user_based: self.user_based(snapshot, user_id, n_sessions),
            item_based: item_based(snapshot, &liked, n_sessions),
            behavior: behavior(snapshot, user_id, &liked, n_sessions),
            liked,
        }
    }

    fn user_based(&self, snapshot: &Snapshot, user_id: UserId, n_sessions: usize) -> Vec<f64> {
        let mut scores = vec![0.0; n_sessions];
        let similarity = snapshot.user_similarity();
        let Some(similarities) = similarity.row(user_id) else {
            return scores;
        };

        let mut neighbors: Vec<(UserId, f64)> = similarity
            .index()
            .ids()
            .iter()
            .zip(similarities)
            .filter(|&(&id, _)| id != user_id)
            .map(|(&id, &sim)| (id, sim))
            .collect();
        neighbors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        neighbors.truncate(self.config.neighbor_count);

        if neighbors.is_empty() {
            return scores;
        }
        for (neighbor, sim) in &neighbors {
            if let Some(row) = snapshot.user_items().row(*neighbor) {
                add_weighted(&mut scores, row, *sim);
            }
        }
        let count = neighbors.len() as f64;
        scores.iter_mut().for_each(|s| *s /= count);
        scores
    }
}

fn item_based(snapshot: &Snapshot, liked: &[usize], n_sessions: usize) -> Vec<f64> {
    let mut scores = vec![0.0; n_sessions];
    if liked.is_empty() {
        return scores;
    }

    let similarity = snapshot.session_similarity();
    let alignment = snapshot.session_alignment();
    for &liked_col in liked {
        let Some(liked_pos) = alignment[liked_col] else {
            continue;
        };
        let row = similarity.row_at(liked_pos);
        for (score, pos) in scores.iter_mut().zip(alignment) {
            if let Some(pos) = pos {
                *score += row[*pos];
            }
        }
    }
    scores
}

fn behavior(snapshot: &Snapshot, user_id: UserId, liked: &[usize], n_sessions: usize) -> Vec<f64> {
    let mut scores = vec![0.0; n_sessions];
    if liked.is_empty() {
        return scores;
    }

    let items = snapshot.user_items();
    let target_similarities = snapshot.user_similarity().row(user_id);
    let alignment = snapshot.user_alignment();

    let mut co_enrolled = 0usize;
    for (row_pos, sim_pos) in alignment.iter().enumerate() {
        let row = items.row_at(row_pos);
        if !liked.iter().any(|&col| row[col] == 1) {
            continue;
        }
        co_enrolled += 1;
        let weight = match (target_similarities, sim_pos) {
            (Some(similarities), Some(pos)) => similarities[*pos],
            _ => 0.0,
        };
        add_weighted(&mut scores, row, weight);
    }

    if co_enrolled > 0 {
        let count = co_enrolled as f64;
        scores.iter_mut().for_each(|s| *s /= count);
    }
    scores
}

fn add_weighted(scores: &mut [f64], row: &[u8], weight: f64) {
    for (score, &cell) in scores.iter_mut().zip(row) {
        *score += weight * f64::from(cell);
    }
}
