//! WellnessEngine - the operations exposed to the conversational agent and
//! the scheduled check-in driver.
//!
//! The engine wires the session handlers to the aggregator and the spike
//! detector: a finalized score flows into the profile, the profile write
//! appends history, and the new composite is checked for a spike. Spike
//! evaluation never fails the call that triggered it.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error};

use crate::domain::assessment::{AssessmentError, AssessmentSession};
use crate::domain::catalog::PressureZone;
use crate::domain::foundation::{AssessmentSessionId, UserId};
use crate::domain::scoring::{ParsePolicy, RawValue, ScoreResult};
use crate::domain::wellness::{
    ScoreHistoryEntry, ScoreTrigger, SpikeDecision, SpikePolicy, WellnessError, WellnessProfile,
};
use crate::ports::{AssessmentSessionRepository, ScoreHistoryReader, WellnessProfileRepository};

use super::handlers::assessment::{
    FinalizeAssessmentCommand, FinalizeAssessmentHandler, GetActiveSessionHandler,
    GetActiveSessionQuery, RecordAnswerCommand, RecordAnswerHandler, StartAssessmentCommand,
    StartAssessmentHandler, StartAssessmentResult,
};
use super::handlers::wellness::{
    ApplyInstrumentResultCommand, ApplyInstrumentResultHandler, EvaluateSpikeCommand,
    EvaluateSpikeHandler, GetHistoryHandler, GetHistoryQuery, GetProfileHandler, GetProfileQuery,
    ProfileUpdate, ProfileWriter, RecordObservationCommand, RecordObservationHandler,
    SpikeCollaborators,
};

/// A response as it arrives from a caller: free text or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Number(f64),
    Text(String),
}

impl AnswerInput {
    pub fn to_raw_value(&self, policy: &ParsePolicy) -> RawValue {
        match self {
            AnswerInput::Number(v) => RawValue::from_number(*v),
            AnswerInput::Text(token) => RawValue::parse(token, policy),
        }
    }
}

impl From<f64> for AnswerInput {
    fn from(v: f64) -> Self {
        AnswerInput::Number(v)
    }
}

impl From<&str> for AnswerInput {
    fn from(token: &str) -> Self {
        AnswerInput::Text(token.to_string())
    }
}

/// Persistence ports and outreach collaborators.
#[derive(Clone)]
pub struct EngineDependencies {
    pub sessions: Arc<dyn AssessmentSessionRepository>,
    pub profiles: Arc<dyn WellnessProfileRepository>,
    pub history: Arc<dyn ScoreHistoryReader>,
    pub outreach: SpikeCollaborators,
}

/// Tunables resolved from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub parse_policy: ParsePolicy,
    pub spike_policy: SpikePolicy,
    pub max_merge_attempts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            parse_policy: ParsePolicy::default(),
            spike_policy: SpikePolicy::default(),
            max_merge_attempts: 5,
        }
    }
}

/// What a profile write produced downstream of a score.
#[derive(Debug, Clone)]
pub struct ProfileChange {
    pub profile: WellnessProfile,
    pub entry: ScoreHistoryEntry,
    pub spike: SpikeDecision,
}

/// Result of `record_answer`.
#[derive(Debug, Clone)]
pub struct AnswerRecorded {
    pub session: AssessmentSession,
    /// Present when this answer completed the instrument.
    pub result: Option<ScoreResult>,
    /// Present when the completed instrument had usable answers.
    pub change: Option<ProfileChange>,
    /// Set when the score could not be merged into the profile. The score is
    /// still valid and can be re-applied with [`WellnessEngine::apply_score`].
    pub profile_error: Option<WellnessError>,
}

impl AnswerRecorded {
    pub fn completed(&self) -> bool {
        self.result.is_some()
    }
}

/// Result of `finalize_assessment`.
#[derive(Debug, Clone)]
pub struct AssessmentFinalized {
    pub session: AssessmentSession,
    pub result: ScoreResult,
    pub change: Option<ProfileChange>,
    pub profile_error: Option<WellnessError>,
}

/// Facade over the assessment, aggregation and spike handlers.
#[derive(Clone)]
pub struct WellnessEngine {
    parse_policy: ParsePolicy,
    start: Arc<StartAssessmentHandler>,
    record: Arc<RecordAnswerHandler>,
    finalize: Arc<FinalizeAssessmentHandler>,
    active: Arc<GetActiveSessionHandler>,
    apply_result: Arc<ApplyInstrumentResultHandler>,
    observe: Arc<RecordObservationHandler>,
    spike: Arc<EvaluateSpikeHandler>,
    profile: Arc<GetProfileHandler>,
    history: Arc<GetHistoryHandler>,
}

impl WellnessEngine {
    pub fn new(deps: EngineDependencies, settings: EngineSettings) -> Self {
        let writer = Arc::new(ProfileWriter::new(
            deps.profiles.clone(),
            settings.max_merge_attempts,
        ));
        Self {
            parse_policy: settings.parse_policy,
            start: Arc::new(StartAssessmentHandler::new(deps.sessions.clone())),
            record: Arc::new(RecordAnswerHandler::new(deps.sessions.clone())),
            finalize: Arc::new(FinalizeAssessmentHandler::new(deps.sessions.clone())),
            active: Arc::new(GetActiveSessionHandler::new(deps.sessions)),
            apply_result: Arc::new(ApplyInstrumentResultHandler::new(writer.clone())),
            observe: Arc::new(RecordObservationHandler::new(writer)),
            spike: Arc::new(EvaluateSpikeHandler::new(
                deps.outreach,
                settings.spike_policy,
            )),
            profile: Arc::new(GetProfileHandler::new(deps.profiles)),
            history: Arc::new(GetHistoryHandler::new(deps.history)),
        }
    }

    pub fn parse_policy(&self) -> &ParsePolicy {
        &self.parse_policy
    }

    /// Opens a session, superseding any active one for the same instrument.
    pub async fn start_assessment(
        &self,
        user_id: &UserId,
        instrument: &str,
    ) -> Result<StartAssessmentResult, AssessmentError> {
        self.start
            .handle(StartAssessmentCommand {
                user_id: user_id.clone(),
                instrument: instrument.to_string(),
            })
            .await
    }

    /// Records one answer. The answer that completes the instrument also
    /// scores it and updates the profile.
    pub async fn record_answer(
        &self,
        user_id: &UserId,
        session_id: AssessmentSessionId,
        question_id: &str,
        value: impl Into<AnswerInput>,
    ) -> Result<AnswerRecorded, AssessmentError> {
        let value = value.into().to_raw_value(&self.parse_policy);
        let recorded = self
            .record
            .handle(RecordAnswerCommand {
                user_id: user_id.clone(),
                session_id,
                question_id: question_id.to_string(),
                value,
            })
            .await?;

        let (change, profile_error) = match &recorded.result {
            Some(result) => self.propagate(user_id, result).await,
            None => (None, None),
        };

        Ok(AnswerRecorded {
            session: recorded.session,
            result: recorded.result,
            change,
            profile_error,
        })
    }

    /// Scores an active session with whatever answers it has.
    pub async fn finalize_assessment(
        &self,
        user_id: &UserId,
        session_id: AssessmentSessionId,
    ) -> Result<AssessmentFinalized, AssessmentError> {
        let finalized = self
            .finalize
            .handle(FinalizeAssessmentCommand {
                user_id: user_id.clone(),
                session_id,
            })
            .await?;
        let (change, profile_error) = self.propagate(user_id, &finalized.result).await;

        Ok(AssessmentFinalized {
            session: finalized.session,
            result: finalized.result,
            change,
            profile_error,
        })
    }

    pub async fn get_active_session(
        &self,
        user_id: &UserId,
        instrument: Option<&str>,
    ) -> Result<Option<AssessmentSession>, AssessmentError> {
        self.active
            .handle(GetActiveSessionQuery {
                user_id: user_id.clone(),
                instrument: instrument.map(str::to_string),
            })
            .await
    }

    pub async fn get_current_profile(
        &self,
        user_id: &UserId,
    ) -> Result<WellnessProfile, WellnessError> {
        self.profile
            .handle(GetProfileQuery {
                user_id: user_id.clone(),
            })
            .await
    }

    /// History newest first.
    pub async fn get_history(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ScoreHistoryEntry>, WellnessError> {
        self.history
            .handle(GetHistoryQuery {
                user_id: user_id.clone(),
                limit,
            })
            .await
    }

    /// Merges one observed zone value and runs spike evaluation on the
    /// resulting composite.
    pub async fn record_observation(
        &self,
        user_id: &UserId,
        zone: PressureZone,
        value: f64,
    ) -> Result<ProfileChange, WellnessError> {
        let update = self
            .observe
            .handle(RecordObservationCommand {
                user_id: user_id.clone(),
                zone,
                value,
            })
            .await?;
        Ok(self.with_spike(update).await)
    }

    /// Merges a finished instrument's score into the profile and evaluates
    /// the spike. A score with no composite leaves the profile unchanged.
    pub async fn apply_score(
        &self,
        user_id: &UserId,
        result: &ScoreResult,
    ) -> Result<Option<ProfileChange>, WellnessError> {
        let Some(composite) = result.composite_score else {
            debug!(
                user_id = %user_id,
                instrument = %result.instrument,
                "No usable answers; profile left unchanged"
            );
            return Ok(None);
        };

        let update = self
            .apply_result
            .handle(ApplyInstrumentResultCommand {
                user_id: user_id.clone(),
                deltas: result.canonical_zones.clone(),
                new_composite: composite,
                trigger: ScoreTrigger::for_instrument(result.instrument),
            })
            .await?;

        Ok(Some(self.with_spike(update).await))
    }

    /// The session is already completed when this runs, so a failed merge is
    /// reported alongside the score instead of failing the call.
    async fn propagate(
        &self,
        user_id: &UserId,
        result: &ScoreResult,
    ) -> (Option<ProfileChange>, Option<WellnessError>) {
        match self.apply_score(user_id, result).await {
            Ok(change) => (change, None),
            Err(err) => {
                error!(
                    user_id = %user_id,
                    instrument = %result.instrument,
                    error = %err,
                    "Scored session could not be merged into the profile"
                );
                (None, Some(err))
            }
        }
    }

    async fn with_spike(&self, update: ProfileUpdate) -> ProfileChange {
        let spike = self
            .spike
            .handle(EvaluateSpikeCommand {
                user_id: update.profile.user_id().clone(),
                old_composite: update.entry.old_composite,
                new_composite: update.entry.new_composite,
                zones: *update.profile.zones(),
            })
            .await;
        ProfileChange {
            profile: update.profile,
            entry: update.entry,
            spike,
        }
    }
}
