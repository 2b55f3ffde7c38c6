use std::fmt;

use tracing::{error, warn};

use crate::recommendation::assembler::Recommendation;
use crate::store::JobStore;

/// Jobs returned when the model produced nothing usable.
pub const FALLBACK_SIZE: usize = 3;

/// Neutral score attached to every fallback job.
pub const FALLBACK_SCORE: f64 = 50.0;

/// Why the model-derived result set came out empty. Only logged; the caller
/// sees the same fallback for every reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No usable entries in the model's `matches` list.
    NoMatches,
    /// Every entry had a malformed job id.
    NoValidIds,
    /// Ids were well-formed but none exist in the store.
    NoResolvedJobs,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FallbackReason::NoMatches => "model returned no usable matches",
            FallbackReason::NoValidIds => "no match had a valid job id",
            FallbackReason::NoResolvedJobs => "no matched job id exists in the store",
        })
    }
}

/// Returns the most recent jobs with a neutral score. Never fails: a store
/// error yields an empty list.
pub async fn fallback_recommendations(
    store: &dyn JobStore,
    reason: FallbackReason,
) -> Vec<Recommendation> {
    warn!("No valid recommendations ({reason}), returning recent jobs");

    match store.find_jobs(FALLBACK_SIZE).await {
        Ok(jobs) => jobs
            .into_iter()
            .take(FALLBACK_SIZE)
            .map(|job| Recommendation {
                job_id: job.id.clone(),
                match_score: FALLBACK_SCORE,
                job_details: job,
            })
            .collect(),
        Err(e) => {
            error!("Fallback job lookup failed: {e}");
            Vec::new()
        }
    }
}
