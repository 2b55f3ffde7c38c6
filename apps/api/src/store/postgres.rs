use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::job::{JobId, JobRecord};
use crate::models::user::UserRecord;
use crate::store::JobStore;

const JOB_COLUMNS: &str =
    "id, title, company, location, job_type, salary_range, skills, description, created_at";

/// PostgreSQL-backed store.
///
/// Expects `users(email TEXT UNIQUE, name TEXT NULL, profile JSONB NULL)` and
/// `jobs(id TEXT PRIMARY KEY, title, company, location, job_type,
/// salary_range, skills TEXT[], description, created_at TIMESTAMPTZ)`.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>("SELECT email, name, profile FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_jobs(&self, limit: usize) -> Result<Vec<JobRecord>, sqlx::Error> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC, id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_jobs_by_ids(&self, ids: &[JobId]) -> Result<Vec<JobRecord>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(JobId::key).collect();
        sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE lower(id) = ANY($1)"
        ))
        .bind(&keys)
        .fetch_all(&self.pool)
        .await
    }
}
