use sqlx::{mysql::MySqlPoolOptions, MySqlPool};

use crate::{
    db::DataSource,
    error::AppResult,
    models::{Enrollment, RawDataset, Session, Tag, User},
};

const USERS_QUERY: &str = r#"
    SELECT CAST(user_id AS SIGNED) AS user_id, job, interests, CAST(years AS DOUBLE) AS years
    FROM users
"#;

const SESSIONS_QUERY: &str = r#"
    SELECT CAST(session_id AS SIGNED) AS session_id
    FROM sessions
"#;

const ENROLLMENTS_QUERY: &str = r#"
    SELECT CAST(user_id AS SIGNED) AS user_id, CAST(session_id AS SIGNED) AS session_id
    FROM my_sessions
"#;

const TAGS_QUERY: &str = r#"
    SELECT CAST(session_id AS SIGNED) AS session_id, field, topic, `type`, level
    FROM tags
"#;

/// Creates a MySQL connection pool
///
/// Connections are opened on first use, so an unreachable database shows
/// up as a failed refresh cycle instead of a startup failure.
pub fn create_pool(database_url: &str) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(5)
        .connect_lazy(database_url)?;

    Ok(pool)
}

/// Reads the users, sessions, my_sessions and tags tables in full
#[derive(Clone)]
pub struct MySqlDataSource {
    pool: MySqlPool,
}

impl MySqlDataSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DataSource for MySqlDataSource {
    async fn load(&self) -> AppResult<RawDataset> {
        let (users, sessions, enrollments, tags) = tokio::try_join!(
            sqlx::query_as::<_, User>(USERS_QUERY).fetch_all(&self.pool),
            sqlx::query_as::<_, Session>(SESSIONS_QUERY).fetch_all(&self.pool),
            sqlx::query_as::<_, Enrollment>(ENROLLMENTS_QUERY).fetch_all(&self.pool),
            sqlx::query_as::<_, Tag>(TAGS_QUERY).fetch_all(&self.pool),
        )?;

        tracing::debug!(
            users = users.len(),
            sessions = sessions.len(),
            enrollments = enrollments.len(),
            tags = tags.len(),
            "Loaded tables from MySQL"
        );

        Ok(RawDataset {
            users,
            sessions,
            enrollments,
            tags,
        })
    }

    fn name(&self) -> &'static str {
        "mysql"
    }
}
