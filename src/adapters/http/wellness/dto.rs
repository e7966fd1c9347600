//! HTTP DTOs for assessment and profile endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::{AnswerInput, ProfileChange};
use crate::domain::assessment::AssessmentSession;
use crate::domain::catalog::{zones_for, AssessmentDefinition, Catalog, PressureZone, Question};
use crate::domain::foundation::{AssessmentStatus, Timestamp};
use crate::domain::scoring::{Band, RiskLevel, ScoreResult};
use crate::domain::wellness::{
    PressureZoneProfile, ScoreHistoryEntry, ScoreTrigger, SpikeDecision, SpikeReason,
    WellnessProfile,
};

/// Default page size for history requests.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start an assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct StartAssessmentRequest {
    pub instrument: String,
}

/// Query parameters for the active-session lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveSessionQuery {
    #[serde(default)]
    pub instrument: Option<String>,
}

/// Request to record one answer. `value` is a number or a raw token.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAnswerRequest {
    pub question_id: String,
    pub value: AnswerInput,
}

/// Query parameters for history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

/// Request to record an ad-hoc zone observation.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordObservationRequest {
    pub zone: String,
    pub value: f64,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub id: String,
    pub text: String,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl From<&Question> for QuestionResponse {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            text: question.text.clone(),
            scale_min: question.scale.min(),
            scale_max: question.scale.max(),
        }
    }
}

/// Response for a newly started session.
#[derive(Debug, Clone, Serialize)]
pub struct StartAssessmentResponse {
    pub session_id: String,
    pub instrument: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_session_id: Option<String>,
    pub first_question: Option<QuestionResponse>,
}

/// Session view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub user_id: String,
    pub instrument: String,
    pub status: AssessmentStatus,
    pub answered: usize,
    pub question_count: usize,
    pub next_question: Option<QuestionResponse>,
    pub started_at: String,
    pub updated_at: String,
}

impl From<&AssessmentSession> for SessionResponse {
    fn from(session: &AssessmentSession) -> Self {
        let definition = Catalog::global().definition(session.instrument());
        Self {
            id: session.id().to_string(),
            user_id: session.user_id().to_string(),
            instrument: session.instrument().to_string(),
            status: session.status(),
            answered: session.current_index(),
            question_count: definition.question_count(),
            next_question: next_question(session, definition),
            started_at: rfc3339(session.started_at()),
            updated_at: rfc3339(session.updated_at()),
        }
    }
}

/// Envelope for the optional active session.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSessionResponse {
    pub session: Option<SessionResponse>,
}

/// Instrument score as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub instrument: String,
    pub composite_score: Option<f64>,
    pub band: Option<Band>,
    pub risk_level: Option<RiskLevel>,
    pub zone_averages: BTreeMap<String, f64>,
    pub canonical_zones: BTreeMap<PressureZone, f64>,
    pub confidence: f64,
    pub answered_count: usize,
    pub question_count: usize,
    pub clamped: bool,
}

impl From<&ScoreResult> for ScoreResponse {
    fn from(result: &ScoreResult) -> Self {
        Self {
            instrument: result.instrument.to_string(),
            composite_score: result.composite_score,
            band: result.band,
            risk_level: result.risk_level,
            zone_averages: result.zone_averages.clone(),
            canonical_zones: result.canonical_zones.clone(),
            confidence: result.confidence,
            answered_count: result.answered_count,
            question_count: result.question_count,
            clamped: result.clamped,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpikeResponse {
    pub should_follow_up: bool,
    pub reason: SpikeReason,
    pub delta: f64,
}

impl From<&SpikeDecision> for SpikeResponse {
    fn from(decision: &SpikeDecision) -> Self {
        Self {
            should_follow_up: decision.should_follow_up,
            reason: decision.reason,
            delta: decision.delta,
        }
    }
}

/// Profile plus the spike decision a write produced.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileChangeResponse {
    pub profile: ProfileResponse,
    pub spike: SpikeResponse,
}

impl From<&ProfileChange> for ProfileChangeResponse {
    fn from(change: &ProfileChange) -> Self {
        Self {
            profile: (&change.profile).into(),
            spike: (&change.spike).into(),
        }
    }
}

/// Response after recording an answer or finalizing.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub session_id: String,
    pub completed: bool,
    pub next_question: Option<QuestionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoreResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_change: Option<ProfileChangeResponse>,
    /// The score is final but was not merged into the profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_error: Option<ErrorResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneResponse {
    pub zone: PressureZone,
    pub name: &'static str,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub composite: Option<f64>,
    pub zones: Vec<ZoneResponse>,
    pub last_trigger: Option<ScoreTrigger>,
    pub updated_at: Option<String>,
}

impl From<&WellnessProfile> for ProfileResponse {
    fn from(profile: &WellnessProfile) -> Self {
        Self {
            user_id: profile.user_id().to_string(),
            composite: profile.composite(),
            zones: zone_list(profile.zones()),
            last_trigger: profile.last_trigger(),
            updated_at: profile.updated_at().map(rfc3339),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntryResponse {
    pub old_composite: Option<f64>,
    pub new_composite: f64,
    pub delta: f64,
    pub trigger: ScoreTrigger,
    pub zones: PressureZoneProfile,
    pub recorded_at: String,
}

impl From<&ScoreHistoryEntry> for HistoryEntryResponse {
    fn from(entry: &ScoreHistoryEntry) -> Self {
        Self {
            old_composite: entry.old_composite,
            new_composite: entry.new_composite,
            delta: entry.delta(),
            trigger: entry.trigger,
            zones: entry.zone_snapshot,
            recorded_at: rfc3339(&entry.recorded_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<HistoryEntryResponse>,
}

/// Catalog summary entry.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentResponse {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub version: &'static str,
    pub question_count: usize,
    pub cooldown_days: i64,
    pub zones: Vec<PressureZone>,
}

impl From<&AssessmentDefinition> for InstrumentResponse {
    fn from(definition: &AssessmentDefinition) -> Self {
        Self {
            slug: definition.slug().to_string(),
            title: definition.title().to_string(),
            description: definition.description().to_string(),
            version: definition.version(),
            question_count: definition.question_count(),
            cooldown_days: definition.cooldown().num_days(),
            zones: zones_for(definition.slug()),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

pub fn next_question(
    session: &AssessmentSession,
    definition: &AssessmentDefinition,
) -> Option<QuestionResponse> {
    if !session.is_active() {
        return None;
    }
    session
        .next_question_id(definition)
        .and_then(|id| definition.question(id))
        .map(QuestionResponse::from)
}

fn zone_list(zones: &PressureZoneProfile) -> Vec<ZoneResponse> {
    PressureZone::ALL
        .iter()
        .map(|zone| ZoneResponse {
            zone: *zone,
            name: zone.display_name(),
            value: zones.get(*zone),
        })
        .collect()
}

fn rfc3339(ts: &Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::InstrumentSlug;
    use crate::domain::foundation::UserId;

    #[test]
    fn record_answer_request_accepts_number_or_token() {
        let numeric: RecordAnswerRequest =
            serde_json::from_str(r#"{"question_id": "ema_1", "value": 4}"#).unwrap();
        assert_eq!(numeric.value, AnswerInput::Number(4.0));

        let token: RecordAnswerRequest =
            serde_json::from_str(r#"{"question_id": "ema_1", "value": "SKIPPED"}"#).unwrap();
        assert_eq!(token.value, AnswerInput::Text("SKIPPED".to_string()));
    }

    #[test]
    fn history_query_defaults_to_twenty() {
        assert_eq!(HistoryQuery::default().limit(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn new_session_response_points_at_first_question() {
        let session = AssessmentSession::start(
            UserId::new("caregiver-1").unwrap(),
            InstrumentSlug::Ema,
            Timestamp::now(),
        );

        let response = SessionResponse::from(&session);

        assert_eq!(response.instrument, "ema");
        assert_eq!(response.answered, 0);
        assert_eq!(response.question_count, 3);
        assert_eq!(response.next_question.unwrap().id, "ema_1");
    }

    #[test]
    fn profile_response_lists_all_six_zones() {
        let profile = WellnessProfile::new(UserId::new("caregiver-1").unwrap());
        let response = ProfileResponse::from(&profile);

        assert_eq!(response.zones.len(), 6);
        assert!(response.zones.iter().all(|z| z.value.is_none()));
        assert_eq!(response.composite, None);
    }

    #[test]
    fn instrument_response_summarizes_sdoh() {
        let definition = Catalog::global().definition(InstrumentSlug::Sdoh);
        let response = InstrumentResponse::from(definition);

        assert_eq!(response.question_count, 28);
        assert_eq!(response.cooldown_days, 30);
        assert!(!response.zones.contains(&PressureZone::P2));
    }
}
