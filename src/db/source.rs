use crate::{error::AppResult, models::RawDataset};

/// Source of the raw entity tables feeding each refresh cycle
///
/// Every call returns a complete snapshot of users, sessions, enrollments
/// and tags. Implementations must not return partial data: any failure is
/// reported as an error so the refresher can keep the last good snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Loads all four record streams
    async fn load(&self) -> AppResult<RawDataset>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}
