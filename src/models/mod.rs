use serde::{Deserialize, Serialize};

mod matrix;
mod snapshot;

pub use matrix::{IdIndex, SimilarityMatrix, UserItemMatrix};
pub use snapshot::{Snapshot, SnapshotSummary};

pub type UserId = i64;
pub type SessionId = i64;

/// A user row as delivered by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: UserId,
    pub job: Option<String>,
    pub interests: Option<String>,
    /// Years of experience
    pub years: Option<f64>,
}

/// A session row. Display fields stay with the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub session_id: SessionId,
}

/// One content tag attached to a session. A session may carry many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub session_id: SessionId,
    pub field: Option<String>,
    pub topic: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub level: Option<String>,
}

/// "User registered for session"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Enrollment {
    pub user_id: UserId,
    pub session_id: SessionId,
}

/// Full reload of the four record streams for one refresh cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDataset {
    pub users: Vec<User>,
    pub sessions: Vec<Session>,
    pub enrollments: Vec<Enrollment>,
    pub tags: Vec<Tag>,
}

impl User {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            job: None,
            interests: None,
            years: None,
        }
    }

    pub fn with_job(mut self, job: &str) -> Self {
        self.job = Some(job.to_string());
        self
    }

    pub fn with_interests(mut self, interests: &str) -> Self {
        self.interests = Some(interests.to_string());
        self
    }

    pub fn with_years(mut self, years: f64) -> Self {
        self.years = Some(years);
        self
    }
}

impl Tag {
    /// A tag carrying only a `field` value
    pub fn field(session_id: SessionId, field: &str) -> Self {
        Self {
            session_id,
            field: Some(field.to_string()),
            topic: None,
            kind: None,
            level: None,
        }
    }
}

impl Enrollment {
    pub fn new(user_id: UserId, session_id: SessionId) -> Self {
        Self {
            user_id,
            session_id,
        }
    }
}
