//! RecordAnswerHandler - Command handler for submitting one answer.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::assessment::{AnswerOutcome, AssessmentError, AssessmentSession};
use crate::domain::catalog::Catalog;
use crate::domain::foundation::{AssessmentSessionId, Timestamp, UserId};
use crate::domain::scoring::{RawValue, ScoreResult};
use crate::ports::AssessmentSessionRepository;

use super::{load_active_session, session_error, MAX_SESSION_WRITE_ATTEMPTS};

/// Command to record one answer.
#[derive(Debug, Clone)]
pub struct RecordAnswerCommand {
    pub user_id: UserId,
    pub session_id: AssessmentSessionId,
    pub question_id: String,
    pub value: RawValue,
}

/// Result of recording an answer.
#[derive(Debug, Clone)]
pub struct RecordAnswerResult {
    pub session: AssessmentSession,
    pub outcome: AnswerOutcome,
    /// Present when this answer completed the instrument.
    pub result: Option<ScoreResult>,
}

impl RecordAnswerResult {
    pub fn completed(&self) -> bool {
        self.result.is_some()
    }
}

/// Handler for recording answers.
///
/// Re-submitting a question replaces the earlier answer without advancing
/// progress, so message retries are harmless. The answer that covers the
/// last unanswered question finalizes and scores the session in the same
/// write.
pub struct RecordAnswerHandler {
    repository: Arc<dyn AssessmentSessionRepository>,
}

impl RecordAnswerHandler {
    pub fn new(repository: Arc<dyn AssessmentSessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: RecordAnswerCommand,
    ) -> Result<RecordAnswerResult, AssessmentError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let now = Timestamp::now();

            let mut session =
                load_active_session(self.repository.as_ref(), &cmd.user_id, cmd.session_id)
                    .await?;
            let loaded_version = session.version();
            let definition = Catalog::global().definition(session.instrument());

            let outcome = session
                .record_answer(definition, &cmd.question_id, cmd.value.clone(), now)
                .map_err(|e| session_error(e, &session, &cmd.question_id))?;

            let result = if session.all_answered(definition) {
                Some(
                    session
                        .finalize(definition, now)
                        .map_err(|e| session_error(e, &session, &cmd.question_id))?,
                )
            } else {
                None
            };

            match self.repository.update(&session, loaded_version).await {
                Ok(()) => {
                    debug!(
                        user_id = %cmd.user_id,
                        session_id = %cmd.session_id,
                        question_id = %cmd.question_id,
                        outcome = ?outcome,
                        current_index = session.current_index(),
                        "Answer recorded"
                    );
                    if let Some(scored) = &result {
                        info!(
                            user_id = %cmd.user_id,
                            session_id = %cmd.session_id,
                            instrument = %session.instrument(),
                            composite = ?scored.composite_score,
                            confidence = scored.confidence,
                            clamped = scored.clamped,
                            "Assessment finalized"
                        );
                    }
                    return Ok(RecordAnswerResult {
                        session,
                        outcome,
                        result,
                    });
                }
                Err(err) if err.is_conflict() && attempt < MAX_SESSION_WRITE_ATTEMPTS => {
                    debug!(session_id = %cmd.session_id, attempt, "Session changed, retrying answer");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
