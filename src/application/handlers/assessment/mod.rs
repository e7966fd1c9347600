//! Assessment session command and query handlers.

mod finalize_assessment;
mod get_active_session;
mod record_answer;
mod start_assessment;

pub use finalize_assessment::{
    FinalizeAssessmentCommand, FinalizeAssessmentHandler, FinalizeAssessmentResult,
};
pub use get_active_session::{GetActiveSessionHandler, GetActiveSessionQuery};
pub use record_answer::{RecordAnswerCommand, RecordAnswerHandler, RecordAnswerResult};
pub use start_assessment::{StartAssessmentCommand, StartAssessmentHandler, StartAssessmentResult};

use crate::domain::assessment::{AssessmentError, AssessmentSession};
use crate::domain::foundation::{AssessmentSessionId, DomainError, ErrorCode, UserId};
use crate::ports::AssessmentSessionRepository;

/// Session writes retried on optimistic-locking conflicts.
const MAX_SESSION_WRITE_ATTEMPTS: u32 = 3;

/// Loads a session that exists, belongs to `user_id` and is still active.
async fn load_active_session(
    repository: &dyn AssessmentSessionRepository,
    user_id: &UserId,
    session_id: AssessmentSessionId,
) -> Result<AssessmentSession, AssessmentError> {
    repository
        .find_by_id(&session_id)
        .await?
        .filter(|s| s.is_owned_by(user_id) && s.is_active())
        .ok_or_else(|| AssessmentError::no_active_session(session_id))
}

fn session_error(err: DomainError, session: &AssessmentSession, question_id: &str) -> AssessmentError {
    match err.code {
        ErrorCode::NoActiveSession => AssessmentError::no_active_session(*session.id()),
        ErrorCode::UnknownQuestion => {
            AssessmentError::unknown_question(session.instrument(), question_id)
        }
        _ => err.into(),
    }
}
