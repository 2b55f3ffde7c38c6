//! In-memory fakes for the job store and the inference service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::llm_client::{InferenceClient, LlmError};
use crate::models::job::{JobId, JobRecord};
use crate::models::user::UserRecord;
use crate::store::JobStore;

pub const JOB_A: &str = "65a1f0c2b3d4e5f601234567";
pub const JOB_B: &str = "65a1f0c2b3d4e5f601234568";
pub const JOB_C: &str = "65a1f0c2b3d4e5f601234569";
pub const JOB_D: &str = "65a1f0c2b3d4e5f60123456a";

/// Builds a job posted `age_rank` days before a fixed instant.
/// Rank 0 is the most recent.
pub fn job(id: &str, title: &str, age_rank: i64) -> JobRecord {
    let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    JobRecord {
        id: id.to_string(),
        title: title.to_string(),
        company: format!("{title} Co"),
        location: Some("Remote".to_string()),
        job_type: Some("Full-time".to_string()),
        salary_range: None,
        skills: vec!["Go".to_string(), "SQL".to_string()],
        description: format!("Work as a {title}."),
        created_at: base - Duration::days(age_rank),
    }
}

pub fn user(email: &str, name: Option<&str>, profile: Option<Value>) -> UserRecord {
    UserRecord {
        email: email.to_string(),
        name: name.map(str::to_string),
        profile,
    }
}

#[derive(Default)]
pub struct MemoryJobStore {
    pub users: Vec<UserRecord>,
    pub jobs: Vec<JobRecord>,
    /// When set, `find_jobs` fails with a pool timeout.
    pub fail_find_jobs: bool,
    pub find_jobs_calls: AtomicUsize,
    pub find_by_ids_calls: AtomicUsize,
}

impl MemoryJobStore {
    pub fn new(users: Vec<UserRecord>, jobs: Vec<JobRecord>) -> Self {
        Self {
            users,
            jobs,
            ..Self::default()
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_jobs(&self, limit: usize) -> Result<Vec<JobRecord>, sqlx::Error> {
        self.find_jobs_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find_jobs {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let mut jobs = self.jobs.clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn find_jobs_by_ids(&self, ids: &[JobId]) -> Result<Vec<JobRecord>, sqlx::Error> {
        self.find_by_ids_calls.fetch_add(1, Ordering::SeqCst);
        // Reverse store order so callers cannot rely on lookup order.
        Ok(self
            .jobs
            .iter()
            .rev()
            .filter(|j| ids.iter().any(|id| id.as_str().eq_ignore_ascii_case(&j.id)))
            .cloned()
            .collect())
    }
}

/// What a `ScriptedInference` answers on every call.
pub enum Script {
    Text(String),
    RateLimited,
    Timeout,
    UnexpectedShape,
}

pub struct ScriptedInference {
    script: Script,
    pub calls: AtomicUsize,
    pub last_prompt: Mutex<Option<String>>,
}

impl ScriptedInference {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(Script::Text(text.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.script {
            Script::Text(text) => Ok(text.clone()),
            Script::RateLimited => Err(LlmError::RateLimited),
            Script::Timeout => Err(LlmError::Timeout),
            Script::UnexpectedShape => Err(LlmError::UnexpectedShape("[]".to_string())),
        }
    }
}
