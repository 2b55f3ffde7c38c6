use std::sync::Arc;

use crate::llm_client::InferenceClient;
use crate::recommendation::pipeline::RecommendationSettings;
use crate::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only users and jobs. Postgres in production, in-memory in tests.
    pub store: Arc<dyn JobStore>,
    pub llm: Arc<dyn InferenceClient>,
    pub settings: RecommendationSettings,
}
