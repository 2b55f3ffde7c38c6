//! Result assembly: joins validated matches with authoritative job records.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::job::JobRecord;
use crate::recommendation::validator::ValidatedMatch;
use crate::store::JobStore;

/// A match resolved to a real job. The only result type callers see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub job_id: String,
    pub match_score: f64,
    #[serde(rename = "jobDetails")]
    pub job_details: JobRecord,
}

/// Looks up every matched id in one store query and keeps the matches that
/// resolve, in their original order.
pub async fn resolve_recommendations(
    store: &dyn JobStore,
    matches: &[ValidatedMatch],
) -> Result<Vec<Recommendation>, AppError> {
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<_> = matches.iter().map(|m| m.job_id.clone()).collect();
    let jobs = store.find_jobs_by_ids(&ids).await?;

    Ok(join_matches(matches, jobs))
}

/// Pairs matches with jobs by id, ignoring hex case. Matches without a job
/// are dropped.
pub fn join_matches(matches: &[ValidatedMatch], jobs: Vec<JobRecord>) -> Vec<Recommendation> {
    let by_id: HashMap<String, JobRecord> = jobs
        .into_iter()
        .map(|job| (job.id.to_ascii_lowercase(), job))
        .collect();

    matches
        .iter()
        .filter_map(|m| {
            by_id.get(&m.job_id.key()).map(|job| Recommendation {
                job_id: job.id.clone(),
                match_score: m.match_score,
                job_details: job.clone(),
            })
        })
        .collect()
}
