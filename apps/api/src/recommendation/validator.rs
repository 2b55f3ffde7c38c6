use tracing::debug;

use crate::models::job::JobId;
use crate::recommendation::response_parser::MatchCandidate;

/// A candidate whose id is a well-formed job-store identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMatch {
    pub job_id: JobId,
    pub match_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub accepted: Vec<ValidatedMatch>,
    pub rejected: usize,
}

/// Drops candidates with malformed ids or non-finite scores. Order is kept;
/// a bad entry never fails the batch.
pub fn validate_matches(candidates: Vec<MatchCandidate>) -> Validation {
    let mut validation = Validation::default();

    for candidate in candidates {
        if !candidate.match_score.is_finite() {
            debug!("Dropping match {} with non-finite score", candidate.job_id);
            validation.rejected += 1;
            continue;
        }

        match JobId::parse(&candidate.job_id) {
            Ok(job_id) => validation.accepted.push(ValidatedMatch {
                job_id,
                match_score: candidate.match_score,
            }),
            Err(e) => {
                debug!("Dropping match: {e}");
                validation.rejected += 1;
            }
        }
    }

    validation
}
