//! StartAssessmentHandler - Command handler for starting an instrument.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::assessment::{cooldown_remaining, AssessmentError, AssessmentSession};
use crate::domain::catalog::Catalog;
use crate::domain::foundation::{AssessmentSessionId, Timestamp, UserId};
use crate::ports::AssessmentSessionRepository;

use super::MAX_SESSION_WRITE_ATTEMPTS;

/// Command to start an assessment.
#[derive(Debug, Clone)]
pub struct StartAssessmentCommand {
    pub user_id: UserId,
    pub instrument: String,
}

/// Result of a successful start.
#[derive(Debug, Clone)]
pub struct StartAssessmentResult {
    pub session: AssessmentSession,
    /// The previously active session that was completed without a score.
    pub superseded: Option<AssessmentSessionId>,
}

/// Handler for starting assessments.
///
/// Fails with `CooldownActive` if the instrument was scored for this user
/// within its cooldown. Otherwise any active session for the same pair is
/// superseded and a fresh one is installed in the same repository write.
pub struct StartAssessmentHandler {
    repository: Arc<dyn AssessmentSessionRepository>,
}

impl StartAssessmentHandler {
    pub fn new(repository: Arc<dyn AssessmentSessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: StartAssessmentCommand,
    ) -> Result<StartAssessmentResult, AssessmentError> {
        let definition = Catalog::global().get_definition(&cmd.instrument)?;
        let instrument = definition.slug();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let now = Timestamp::now();

            let last_scored = self
                .repository
                .last_scored_at(&cmd.user_id, instrument)
                .await?;
            if let Some(remaining) =
                cooldown_remaining(last_scored.as_ref(), definition.cooldown(), &now)
            {
                debug!(
                    user_id = %cmd.user_id,
                    instrument = %instrument,
                    remaining_secs = remaining.num_seconds(),
                    "Assessment start refused: cooldown active"
                );
                return Err(AssessmentError::cooldown_active(
                    instrument,
                    remaining,
                    now.plus(remaining),
                ));
            }

            let mut prior = self.repository.find_active(&cmd.user_id, instrument).await?;
            if let Some(old) = prior.as_mut() {
                old.supersede(now)?;
            }

            let session = AssessmentSession::start(cmd.user_id.clone(), instrument, now);
            match self.repository.replace_active(prior.as_ref(), &session).await {
                Ok(()) => {
                    let superseded = prior.as_ref().map(|s| *s.id());
                    info!(
                        user_id = %cmd.user_id,
                        instrument = %instrument,
                        session_id = %session.id(),
                        superseded = ?superseded,
                        "Assessment started"
                    );
                    return Ok(StartAssessmentResult {
                        session,
                        superseded,
                    });
                }
                Err(err) if err.is_conflict() && attempt < MAX_SESSION_WRITE_ATTEMPTS => {
                    debug!(user_id = %cmd.user_id, attempt, "Active session changed, retrying start");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAssessmentSessionStore;
    use crate::domain::catalog::InstrumentSlug;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::domain::scoring::RawValue;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn user() -> UserId {
        UserId::new("caregiver-1").unwrap()
    }

    fn cmd(instrument: &str) -> StartAssessmentCommand {
        StartAssessmentCommand {
            user_id: user(),
            instrument: instrument.to_string(),
        }
    }

    fn scored_session(instrument: InstrumentSlug, days_ago: i64) -> AssessmentSession {
        let at = Timestamp::now().minus_days(days_ago);
        let definition = Catalog::global().definition(instrument);
        let mut session = AssessmentSession::start(user(), instrument, at);
        let first = definition.questions()[0].id.clone();
        session
            .record_answer(definition, &first, RawValue::Likert(3.0), at)
            .unwrap();
        session.finalize(definition, at).unwrap();
        session
    }

    #[tokio::test]
    async fn starts_fresh_session() {
        let store = Arc::new(InMemoryAssessmentSessionStore::new());
        let handler = StartAssessmentHandler::new(store.clone());

        let result = handler.handle(cmd("ema")).await.unwrap();

        assert!(result.session.is_active());
        assert_eq!(result.session.current_index(), 0);
        assert!(result.superseded.is_none());
    }

    #[tokio::test]
    async fn unknown_instrument_is_rejected() {
        let store = Arc::new(InMemoryAssessmentSessionStore::new());
        let handler = StartAssessmentHandler::new(store.clone());

        let err = handler.handle(cmd("bsfc")).await.unwrap_err();
        assert_eq!(err, AssessmentError::UnknownInstrument("bsfc".into()));
        assert_eq!(store.count_for(&user(), InstrumentSlug::Ema).await, 0);
    }

    #[tokio::test]
    async fn restart_supersedes_prior_active_session() {
        let store = Arc::new(InMemoryAssessmentSessionStore::new());
        let handler = StartAssessmentHandler::new(store.clone());

        let first = handler.handle(cmd("ema")).await.unwrap();
        let second = handler.handle(cmd("ema")).await.unwrap();

        assert_eq!(second.superseded, Some(*first.session.id()));
        let active = store.find_active_by_user(&user()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), second.session.id());

        let old = store.find_by_id(first.session.id()).await.unwrap().unwrap();
        assert!(!old.is_active());
        assert_eq!(old.scored_at(), None);
    }

    #[tokio::test]
    async fn cooldown_blocks_recent_scored_instrument() {
        let store = Arc::new(InMemoryAssessmentSessionStore::new());
        store.seed(scored_session(InstrumentSlug::Sdoh, 10)).await;
        let handler = StartAssessmentHandler::new(store.clone());

        let err = handler.handle(cmd("sdoh")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::CooldownActive);
        assert_eq!(err.retry_after_days(), 20);
    }

    #[tokio::test]
    async fn cooldown_expires() {
        let store = Arc::new(InMemoryAssessmentSessionStore::new());
        store.seed(scored_session(InstrumentSlug::Ema, 2)).await;
        let handler = StartAssessmentHandler::new(store.clone());

        assert!(handler.handle(cmd("ema")).await.is_ok());
    }

    #[tokio::test]
    async fn cooldown_is_per_instrument() {
        let store = Arc::new(InMemoryAssessmentSessionStore::new());
        store.seed(scored_session(InstrumentSlug::Sdoh, 1)).await;
        let handler = StartAssessmentHandler::new(store.clone());

        assert!(handler.handle(cmd("ema")).await.is_ok());
    }

    struct AlwaysConflicting {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl AssessmentSessionRepository for AlwaysConflicting {
        async fn replace_active(
            &self,
            _superseded: Option<&AssessmentSession>,
            _started: &AssessmentSession,
        ) -> Result<(), DomainError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::conflict("raced"))
        }

        async fn update(
            &self,
            _session: &AssessmentSession,
            _expected_version: u64,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_by_id(
            &self,
            _id: &AssessmentSessionId,
        ) -> Result<Option<AssessmentSession>, DomainError> {
            Ok(None)
        }

        async fn find_active(
            &self,
            _user_id: &UserId,
            _instrument: InstrumentSlug,
        ) -> Result<Option<AssessmentSession>, DomainError> {
            Ok(None)
        }

        async fn find_active_by_user(
            &self,
            _user_id: &UserId,
        ) -> Result<Vec<AssessmentSession>, DomainError> {
            Ok(vec![])
        }

        async fn last_scored_at(
            &self,
            _user_id: &UserId,
            _instrument: InstrumentSlug,
        ) -> Result<Option<Timestamp>, DomainError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn gives_up_after_repeated_conflicts() {
        let repo = Arc::new(AlwaysConflicting {
            attempts: AtomicU32::new(0),
        });
        let handler = StartAssessmentHandler::new(repo.clone());

        let err = handler.handle(cmd("ema")).await.unwrap_err();

        assert!(matches!(err, AssessmentError::ConcurrencyConflict(_)));
        assert_eq!(repo.attempts.load(Ordering::SeqCst), MAX_SESSION_WRITE_ATTEMPTS);
    }

    #[tokio::test]
    async fn concurrent_starts_leave_one_active_session() {
        let store = Arc::new(InMemoryAssessmentSessionStore::new());
        let handler = Arc::new(StartAssessmentHandler::new(store.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handler = handler.clone();
                tokio::spawn(async move { handler.handle(cmd("ema")).await })
            })
            .collect();
        for task in tasks {
            let _ = task.await.unwrap();
        }

        let active = store.find_active_by_user(&user()).await.unwrap();
        assert_eq!(active.len(), 1);
    }
}
