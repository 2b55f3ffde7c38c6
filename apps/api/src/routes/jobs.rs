use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::job::JobRecord;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/jobs?limit=
/// Most recent jobs first.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    query: Result<Query<JobListQuery>, QueryRejection>,
) -> Result<Json<Vec<JobRecord>>, AppError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let jobs = state.store.find_jobs(limit).await?;
    Ok(Json(jobs))
}
