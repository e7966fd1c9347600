//! HTTP routes for assessment and profile endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    finalize_assessment, get_active_session, get_history, get_profile, list_instruments,
    record_answer, record_observation, start_assessment, WellnessHandlers,
};

/// Per-user routes, mounted under `/api/users/:user_id`.
pub fn user_routes(handlers: WellnessHandlers) -> Router {
    Router::new()
        .route("/assessments", post(start_assessment))
        .route("/assessments/active", get(get_active_session))
        .route("/assessments/:session_id/answers", post(record_answer))
        .route("/assessments/:session_id/finalize", post(finalize_assessment))
        .route("/profile", get(get_profile))
        .route("/history", get(get_history))
        .route("/observations", post(record_observation))
        .with_state(handlers)
}

/// Catalog routes, mounted under `/api`.
pub fn catalog_routes() -> Router {
    Router::new().route("/instruments", get(list_instruments))
}
