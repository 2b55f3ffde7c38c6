//! Job recommendation pipeline.
//!
//! Flow: assemble_profile → sample jobs → build_prompt → generate →
//!       parse_matches → validate_matches → resolve_recommendations →
//!       fallback if nothing resolved.
//!
//! Every step is awaited in sequence. The only outbound network call is the
//! single `generate`.

use tracing::{debug, info, warn};

use crate::config::MAX_JOB_SAMPLE_SIZE;
use crate::errors::AppError;
use crate::llm_client::InferenceClient;
use crate::recommendation::assembler::{resolve_recommendations, Recommendation};
use crate::recommendation::fallback::{fallback_recommendations, FallbackReason};
use crate::recommendation::profile::assemble_profile;
use crate::recommendation::prompt_builder::build_prompt;
use crate::recommendation::response_parser::parse_matches;
use crate::recommendation::validator::validate_matches;
use crate::store::JobStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationSettings {
    /// Jobs rendered into the prompt.
    pub job_sample_size: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            job_sample_size: MAX_JOB_SAMPLE_SIZE,
        }
    }
}

/// Produces ranked recommendations for the user with `email`.
///
/// Errors: `NotFound` (no such user, nothing sent upstream), `RateLimited`,
/// `Upstream`, `Parse`. An empty model result is not an error; it resolves to
/// the fallback set.
pub async fn recommend_jobs(
    store: &dyn JobStore,
    llm: &dyn InferenceClient,
    settings: RecommendationSettings,
    email: &str,
) -> Result<Vec<Recommendation>, AppError> {
    info!("Generating recommendations for {email}");

    // Step 1: Profile (fails before any inference call for unknown users)
    let profile = assemble_profile(store, email).await?;

    // Step 2: Job sample
    let jobs = store.find_jobs(settings.job_sample_size).await?;
    info!("Sampled {} jobs for matching", jobs.len());

    // Step 3: Prompt
    let prompt = build_prompt(&profile, &jobs);
    debug!("Prompt rendered ({} bytes)", prompt.len());

    // Step 4: Inference
    let generated = llm.generate(&prompt).await?;

    // Step 5: Parse. Raw text is logged for diagnostics, never returned.
    let parsed = parse_matches(&generated).map_err(|e| {
        warn!("Parse error: {e}. Raw response text: {generated}");
        AppError::from(e)
    })?;
    if parsed.malformed > 0 {
        warn!("Dropped {} malformed match entries", parsed.malformed);
    }
    let emitted = parsed.candidates.len();

    // Step 6: Validate ids
    let validation = validate_matches(parsed.candidates);
    if validation.rejected > 0 {
        warn!("Dropped {} matches with invalid job ids", validation.rejected);
    }

    // Step 7: Resolve against the store
    let recommendations = resolve_recommendations(store, &validation.accepted).await?;
    let unresolved = validation.accepted.len() - recommendations.len();
    if unresolved > 0 {
        warn!("Dropped {unresolved} matches whose job ids do not exist");
    }

    if !recommendations.is_empty() {
        info!("Returning {} recommendations", recommendations.len());
        return Ok(recommendations);
    }

    // Step 8: Fallback
    let reason = if emitted == 0 {
        FallbackReason::NoMatches
    } else if validation.accepted.is_empty() {
        FallbackReason::NoValidIds
    } else {
        FallbackReason::NoResolvedJobs
    };
    Ok(fallback_recommendations(store, reason).await)
}
