//! FinalizeAssessmentHandler - Command handler for explicit finalization.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::assessment::{AssessmentError, AssessmentSession};
use crate::domain::catalog::Catalog;
use crate::domain::foundation::{AssessmentSessionId, Timestamp, UserId};
use crate::domain::scoring::ScoreResult;
use crate::ports::AssessmentSessionRepository;

use super::{load_active_session, session_error, MAX_SESSION_WRITE_ATTEMPTS};

/// Command to score a session with whatever answers it has.
#[derive(Debug, Clone)]
pub struct FinalizeAssessmentCommand {
    pub user_id: UserId,
    pub session_id: AssessmentSessionId,
}

#[derive(Debug, Clone)]
pub struct FinalizeAssessmentResult {
    pub session: AssessmentSession,
    pub result: ScoreResult,
}

/// Handler for finalizing sessions before every question is answered.
pub struct FinalizeAssessmentHandler {
    repository: Arc<dyn AssessmentSessionRepository>,
}

impl FinalizeAssessmentHandler {
    pub fn new(repository: Arc<dyn AssessmentSessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: FinalizeAssessmentCommand,
    ) -> Result<FinalizeAssessmentResult, AssessmentError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let now = Timestamp::now();

            let mut session =
                load_active_session(self.repository.as_ref(), &cmd.user_id, cmd.session_id)
                    .await?;
            let loaded_version = session.version();
            let definition = Catalog::global().definition(session.instrument());
            let result = session
                .finalize(definition, now)
                .map_err(|e| session_error(e, &session, ""))?;

            match self.repository.update(&session, loaded_version).await {
                Ok(()) => {
                    info!(
                        user_id = %cmd.user_id,
                        session_id = %cmd.session_id,
                        instrument = %session.instrument(),
                        composite = ?result.composite_score,
                        confidence = result.confidence,
                        "Assessment finalized explicitly"
                    );
                    return Ok(FinalizeAssessmentResult { session, result });
                }
                Err(err) if err.is_conflict() && attempt < MAX_SESSION_WRITE_ATTEMPTS => {
                    debug!(session_id = %cmd.session_id, attempt, "Session changed, retrying finalize");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
