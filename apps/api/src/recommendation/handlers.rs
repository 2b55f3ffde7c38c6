//! Axum route handlers for the Recommendation API.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::recommendation::assembler::Recommendation;
use crate::recommendation::pipeline::recommend_jobs;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub email: Option<String>,
}

/// GET /api/v1/recommendations?email=
///
/// Returns AI-ranked job matches for the user, or the fallback set when the
/// model's answer resolves to no known job.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<Vec<Recommendation>>, AppError> {
    let Query(query) = query?;
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("email query parameter is required".to_string()))?;

    let recommendations =
        recommend_jobs(state.store.as_ref(), state.llm.as_ref(), state.settings, email).await?;

    Ok(Json(recommendations))
}
