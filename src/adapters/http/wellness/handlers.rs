//! HTTP handlers for assessment and profile endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::WellnessEngine;
use crate::domain::assessment::AssessmentError;
use crate::domain::catalog::{Catalog, PressureZone};
use crate::domain::foundation::{AssessmentSessionId, UserId};
use crate::domain::wellness::WellnessError;

use super::dto::{
    next_question, ActiveSessionQuery, ActiveSessionResponse, AnswerResponse, ErrorResponse,
    HistoryEntryResponse, HistoryQuery, HistoryResponse, InstrumentResponse,
    ProfileChangeResponse, ProfileResponse, RecordAnswerRequest, RecordObservationRequest,
    ScoreResponse, SessionResponse, StartAssessmentRequest, StartAssessmentResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WellnessHandlers {
    engine: WellnessEngine,
    verbose_errors: bool,
}

impl WellnessHandlers {
    pub fn new(engine: WellnessEngine, verbose_errors: bool) -> Self {
        Self {
            engine,
            verbose_errors,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/instruments - Catalog summary
pub async fn list_instruments() -> Response {
    let items: Vec<InstrumentResponse> = Catalog::global()
        .definitions()
        .iter()
        .map(InstrumentResponse::from)
        .collect();
    (StatusCode::OK, Json(items)).into_response()
}

/// POST /api/users/:user_id/assessments - Start an assessment
pub async fn start_assessment(
    State(handlers): State<WellnessHandlers>,
    Path(user_id): Path<String>,
    Json(req): Json<StartAssessmentRequest>,
) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .engine
        .start_assessment(&user_id, &req.instrument)
        .await
    {
        Ok(started) => {
            let definition = Catalog::global().definition(started.session.instrument());
            let response = StartAssessmentResponse {
                session_id: started.session.id().to_string(),
                instrument: started.session.instrument().to_string(),
                superseded_session_id: started.superseded.map(|id| id.to_string()),
                first_question: next_question(&started.session, definition),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_assessment_error(e, handlers.verbose_errors),
    }
}

/// GET /api/users/:user_id/assessments/active - Current session, if any
pub async fn get_active_session(
    State(handlers): State<WellnessHandlers>,
    Path(user_id): Path<String>,
    Query(query): Query<ActiveSessionQuery>,
) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .engine
        .get_active_session(&user_id, query.instrument.as_deref())
        .await
    {
        Ok(session) => {
            let response = ActiveSessionResponse {
                session: session.as_ref().map(SessionResponse::from),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_assessment_error(e, handlers.verbose_errors),
    }
}

/// POST /api/users/:user_id/assessments/:session_id/answers - Record an answer
pub async fn record_answer(
    State(handlers): State<WellnessHandlers>,
    Path((user_id, session_id)): Path<(String, String)>,
    Json(req): Json<RecordAnswerRequest>,
) -> Response {
    let (user_id, session_id) = match parse_ids(&user_id, &session_id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match handlers
        .engine
        .record_answer(&user_id, session_id, &req.question_id, req.value)
        .await
    {
        Ok(recorded) => {
            let definition = Catalog::global().definition(recorded.session.instrument());
            let response = AnswerResponse {
                session_id: session_id.to_string(),
                completed: recorded.completed(),
                next_question: next_question(&recorded.session, definition),
                result: recorded.result.as_ref().map(ScoreResponse::from),
                profile_change: recorded.change.as_ref().map(ProfileChangeResponse::from),
                profile_error: recorded
                    .profile_error
                    .as_ref()
                    .map(|err| profile_error_response(err, handlers.verbose_errors)),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_assessment_error(e, handlers.verbose_errors),
    }
}

/// POST /api/users/:user_id/assessments/:session_id/finalize - Score now
pub async fn finalize_assessment(
    State(handlers): State<WellnessHandlers>,
    Path((user_id, session_id)): Path<(String, String)>,
) -> Response {
    let (user_id, session_id) = match parse_ids(&user_id, &session_id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match handlers
        .engine
        .finalize_assessment(&user_id, session_id)
        .await
    {
        Ok(finalized) => {
            let response = AnswerResponse {
                session_id: session_id.to_string(),
                completed: true,
                next_question: None,
                result: Some(ScoreResponse::from(&finalized.result)),
                profile_change: finalized.change.as_ref().map(ProfileChangeResponse::from),
                profile_error: finalized
                    .profile_error
                    .as_ref()
                    .map(|err| profile_error_response(err, handlers.verbose_errors)),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_assessment_error(e, handlers.verbose_errors),
    }
}

/// GET /api/users/:user_id/profile - Current pressure-zone profile
pub async fn get_profile(
    State(handlers): State<WellnessHandlers>,
    Path(user_id): Path<String>,
) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.get_current_profile(&user_id).await {
        Ok(profile) => (StatusCode::OK, Json(ProfileResponse::from(&profile))).into_response(),
        Err(e) => handle_wellness_error(e, handlers.verbose_errors),
    }
}

/// GET /api/users/:user_id/history - Score history, newest first
pub async fn get_history(
    State(handlers): State<WellnessHandlers>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.engine.get_history(&user_id, query.limit()).await {
        Ok(entries) => {
            let response = HistoryResponse {
                items: entries.iter().map(HistoryEntryResponse::from).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_wellness_error(e, handlers.verbose_errors),
    }
}

/// POST /api/users/:user_id/observations - Record one zone observation
pub async fn record_observation(
    State(handlers): State<WellnessHandlers>,
    Path(user_id): Path<String>,
    Json(req): Json<RecordObservationRequest>,
) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let zone = match req.zone.parse::<PressureZone>() {
        Ok(zone) => zone,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(e.to_string())),
            )
                .into_response()
        }
    };

    match handlers
        .engine
        .record_observation(&user_id, zone, req.value)
        .await
    {
        Ok(change) => {
            (StatusCode::OK, Json(ProfileChangeResponse::from(&change))).into_response()
        }
        Err(e) => handle_wellness_error(e, handlers.verbose_errors),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn parse_user_id(raw: &str) -> Result<UserId, Response> {
    UserId::new(raw).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!("Invalid user ID: {}", e))),
        )
            .into_response()
    })
}

fn parse_ids(user_id: &str, session_id: &str) -> Result<(UserId, AssessmentSessionId), Response> {
    let user_id = parse_user_id(user_id)?;
    let session_id = session_id.parse::<AssessmentSessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })?;
    Ok((user_id, session_id))
}

fn handle_assessment_error(error: AssessmentError, verbose: bool) -> Response {
    let code = error.code().to_string();
    match &error {
        AssessmentError::UnknownInstrument(_)
        | AssessmentError::UnknownQuestion { .. }
        | AssessmentError::ValidationFailed { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(code, error.message())),
        )
            .into_response(),
        AssessmentError::CooldownActive {
            remaining,
            available_at,
            ..
        } => {
            let retry_after_secs = remaining.num_seconds().max(1);
            let body = ErrorResponse::new(code, error.message()).with_details(json!({
                "retry_after_secs": retry_after_secs,
                "retry_after_days": error.retry_after_days(),
                "available_at": available_at.as_datetime().to_rfc3339(),
            }));
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(body),
            )
                .into_response()
        }
        AssessmentError::NoActiveSession(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(code, error.message())),
        )
            .into_response(),
        AssessmentError::ConcurrencyConflict(_) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(code, error.message())),
        )
            .into_response(),
        AssessmentError::Infrastructure(msg) => {
            error!(error = %msg, "Assessment request failed");
            internal_error(verbose, error.message())
        }
    }
}

fn handle_wellness_error(error: WellnessError, verbose: bool) -> Response {
    let code = error.code().to_string();
    match &error {
        WellnessError::InvalidZoneValue(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(code, error.message())),
        )
            .into_response(),
        WellnessError::ConcurrencyConflict { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(code, error.message())),
        )
            .into_response(),
        WellnessError::Infrastructure(msg) => {
            error!(error = %msg, "Wellness request failed");
            internal_error(verbose, error.message())
        }
    }
}

/// Error body for a score that completed but could not reach the profile.
fn profile_error_response(error: &WellnessError, verbose: bool) -> ErrorResponse {
    let message = match error {
        WellnessError::Infrastructure(_) if !verbose => "An internal error occurred".to_string(),
        _ => error.message(),
    };
    ErrorResponse::new(error.code().to_string(), message)
}

fn internal_error(verbose: bool, message: String) -> Response {
    let message = if verbose {
        message
    } else {
        "An internal error occurred".to_string()
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal(message)),
    )
        .into_response()
}
