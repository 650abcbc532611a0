//! Feature construction for users and sessions.
//!
//! Raw records first go through a normalization pass that fills every
//! optional field with an empty string or zero, so vectorization never
//! has to deal with absence. Users and sessions each get their own
//! independently fitted TF-IDF vocabulary.

use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{IdIndex, Session, SessionId, Tag, User, UserId},
};

use super::tfidf::TfidfVectorizer;

/// Dense row-major feature matrix, one row per entity
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Appends `column` as a new last column
    pub fn with_column(&self, column: &[f64]) -> Self {
        debug_assert_eq!(column.len(), self.rows);
        let cols = self.cols + 1;
        let mut data = Vec::with_capacity(self.rows * cols);
        for (row, &extra) in column.iter().enumerate().take(self.rows) {
            data.extend_from_slice(self.row(row));
            data.push(extra);
        }
        Self {
            rows: self.rows,
            cols,
            data,
        }
    }
}

/// How a session's difficulty level is folded into its text.
///
/// The level ordinal is multiplied by `amplification` and emitted as the
/// token `level<weight>` repeated `repeat` times. Weight 0 emits nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPolicy {
    pub beginner: u32,
    pub intermediate: u32,
    pub advanced: u32,
    pub amplification: u32,
    pub repeat: usize,
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self {
            beginner: 1,
            intermediate: 2,
            advanced: 3,
            amplification: 2,
            repeat: 3,
        }
    }
}

impl LevelPolicy {
    /// Ordinal for a level token; unknown tokens map to 0
    pub fn ordinal(&self, level: &str) -> u32 {
        match level.trim().to_ascii_lowercase().as_str() {
            "b" | "beginner" => self.beginner,
            "i" | "intermediate" => self.intermediate,
            "a" | "advanced" => self.advanced,
            _ => 0,
        }
    }

    /// Text fragment for a session whose tags carry `levels`.
    /// Several distinct levels resolve to the highest ordinal.
    pub fn weight_text(&self, levels: &[String]) -> String {
        let ordinal = levels.iter().map(|l| self.ordinal(l)).max().unwrap_or(0);
        let weight = ordinal * self.amplification;
        if weight == 0 {
            return String::new();
        }
        vec![format!("level{}", weight); self.repeat].join(" ")
    }
}

/// A user with every optional field filled
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedUser {
    pub user_id: UserId,
    pub job: String,
    pub interests: String,
    pub years: f64,
}

impl NormalizedUser {
    fn from_record(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            job: user.job.clone().unwrap_or_default(),
            interests: user.interests.clone().unwrap_or_default(),
            years: user.years.filter(|y| y.is_finite()).unwrap_or(0.0),
        }
    }

    pub fn combined_text(&self) -> String {
        format!("{} {} {}", self.job, self.years, self.interests)
    }
}

/// A session joined with its aggregated tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSession {
    pub session_id: SessionId,
    pub fields: Vec<String>,
    pub topics: Vec<String>,
    pub kinds: Vec<String>,
    pub levels: Vec<String>,
}

impl NormalizedSession {
    pub fn combined_text(&self, policy: &LevelPolicy) -> String {
        format!(
            "{} {} {} {}",
            self.fields.join(" "),
            self.topics.join(" "),
            self.kinds.join(" "),
            policy.weight_text(&self.levels)
        )
    }
}

/// Normalizes users, dropping repeated ids after the first
pub fn normalize_users(users: &[User]) -> Vec<NormalizedUser> {
    let mut seen = IdIndex::new();
    users
        .iter()
        .filter(|u| {
            let fresh = !seen.contains(u.user_id);
            seen.insert(u.user_id);
            fresh
        })
        .map(NormalizedUser::from_record)
        .collect()
}

/// Left-joins sessions with their tags. Every session keeps its row even
/// without tags; tags of unknown sessions are ignored.
pub fn normalize_sessions(sessions: &[Session], tags: &[Tag]) -> Vec<NormalizedSession> {
    let index: IdIndex = sessions.iter().map(|s| s.session_id).collect();
    let mut joined: Vec<NormalizedSession> = index
        .ids()
        .iter()
        .map(|&session_id| NormalizedSession {
            session_id,
            ..Default::default()
        })
        .collect();

    for tag in tags {
        let Some(pos) = index.position(tag.session_id) else {
            continue;
        };
        let session = &mut joined[pos];
        push_distinct(&mut session.fields, &tag.field);
        push_distinct(&mut session.topics, &tag.topic);
        push_distinct(&mut session.kinds, &tag.kind);
        push_distinct(&mut session.levels, &tag.level);
    }
    joined
}

fn push_distinct(values: &mut Vec<String>, value: &Option<String>) {
    if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
}

/// Min-max scales to [0, 1]. A zero range scales everything to 0.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    values
        .iter()
        .map(|v| if range > 0.0 { (v - min) / range } else { 0.0 })
        .collect()
}

/// Per-user features: TF-IDF over the combined profile text plus the
/// min-max scaled experience years.
#[derive(Debug, Clone)]
pub struct UserFeatures {
    pub ids: IdIndex,
    pub text: FeatureMatrix,
    pub years_scaled: Vec<f64>,
}

impl UserFeatures {
    /// Text and scalar features side by side
    pub fn combined(&self) -> FeatureMatrix {
        self.text.with_column(&self.years_scaled)
    }
}

/// Per-session TF-IDF features over the aggregated tag text
#[derive(Debug, Clone)]
pub struct SessionFeatures {
    pub ids: IdIndex,
    pub text: FeatureMatrix,
}

pub fn build_user_features(users: &[User]) -> AppResult<UserFeatures> {
    let users = normalize_users(users);
    if users.is_empty() {
        return Err(AppError::FeatureBuild("no users to vectorize".to_string()));
    }

    let documents: Vec<String> = users.iter().map(NormalizedUser::combined_text).collect();
    let text = TfidfVectorizer::new().fit_transform(&documents);
    let years: Vec<f64> = users.iter().map(|u| u.years).collect();

    Ok(UserFeatures {
        ids: users.iter().map(|u| u.user_id).collect(),
        text,
        years_scaled: min_max_scale(&years),
    })
}

pub fn build_session_features(
    sessions: &[Session],
    tags: &[Tag],
    policy: &LevelPolicy,
) -> AppResult<SessionFeatures> {
    let sessions = normalize_sessions(sessions, tags);
    if sessions.is_empty() {
        return Err(AppError::FeatureBuild("no sessions to vectorize".to_string()));
    }

    let documents: Vec<String> = sessions.iter().map(|s| s.combined_text(policy)).collect();
    let text = TfidfVectorizer::new().fit_transform(&documents);

    Ok(SessionFeatures {
        ids: sessions.iter().map(|s| s.session_id).collect(),
        text,
    })
}

/// Number of distinct sessions carrying at least one tag
pub fn tagged_session_count(tags: &[Tag]) -> usize {
    tags.iter()
        .map(|t| t.session_id)
        .collect::<HashSet<SessionId>>()
        .len()
}
