//! Job store: read-only access to users and job listings.
//!
//! The recommendation pipeline only sees the `JobStore` trait. `AppState`
//! carries an `Arc<dyn JobStore>`, so tests substitute an in-memory store.

use async_trait::async_trait;

use crate::models::job::{JobId, JobRecord};
use crate::models::user::UserRecord;

pub mod postgres;

pub use postgres::PgJobStore;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error>;

    /// Returns up to `limit` jobs, most recent first.
    async fn find_jobs(&self, limit: usize) -> Result<Vec<JobRecord>, sqlx::Error>;

    /// Returns the jobs whose ids are in `ids`, in no particular order.
    /// Unknown ids are skipped.
    async fn find_jobs_by_ids(&self, ids: &[JobId]) -> Result<Vec<JobRecord>, sqlx::Error>;
}
