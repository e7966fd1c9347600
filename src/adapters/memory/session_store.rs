//! In-memory assessment session store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::assessment::AssessmentSession;
use crate::domain::catalog::InstrumentSlug;
use crate::domain::foundation::{AssessmentSessionId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::AssessmentSessionRepository;

/// Session store backed by a `HashMap` behind one async lock.
///
/// Every write checks versions and the one-active-per-pair rule while
/// holding the write lock, so concurrent callers see the same guarantees a
/// transactional database would give.
#[derive(Default)]
pub struct InMemoryAssessmentSessionStore {
    sessions: RwLock<HashMap<AssessmentSessionId, AssessmentSession>>,
}

impl InMemoryAssessmentSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a session as-is, bypassing checks. For seeding tests.
    pub async fn seed(&self, session: AssessmentSession) {
        self.sessions.write().await.insert(*session.id(), session);
    }

    /// Number of sessions for a pair in any state.
    pub async fn count_for(&self, user_id: &UserId, instrument: InstrumentSlug) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id() == user_id && s.instrument() == instrument)
            .count()
    }

    fn stale(session: &AssessmentSession) -> DomainError {
        DomainError::conflict(format!(
            "Assessment session {} was modified concurrently",
            session.id()
        ))
    }

    fn check_version(
        stored: Option<&AssessmentSession>,
        incoming: &AssessmentSession,
        expected_version: u64,
    ) -> Result<(), DomainError> {
        match stored {
            Some(current) if current.version() == expected_version => Ok(()),
            Some(_) => Err(Self::stale(incoming)),
            None => Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Assessment session {} not found", incoming.id()),
            )),
        }
    }
}

#[async_trait]
impl AssessmentSessionRepository for InMemoryAssessmentSessionStore {
    async fn replace_active(
        &self,
        superseded: Option<&AssessmentSession>,
        started: &AssessmentSession,
    ) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;

        let current_active = sessions
            .values()
            .find(|s| {
                s.is_active()
                    && s.user_id() == started.user_id()
                    && s.instrument() == started.instrument()
            })
            .map(|s| *s.id());

        match (current_active, superseded) {
            (None, None) => {}
            (Some(active_id), Some(old)) if active_id == *old.id() => {
                // supersede is a single mutation
                Self::check_version(sessions.get(&active_id), old, old.version() - 1)?;
            }
            _ => return Err(Self::stale(started)),
        }

        if sessions.contains_key(started.id()) {
            return Err(Self::stale(started));
        }

        if let Some(old) = superseded {
            sessions.insert(*old.id(), old.clone());
        }
        sessions.insert(*started.id(), started.clone());
        Ok(())
    }

    async fn update(
        &self,
        session: &AssessmentSession,
        expected_version: u64,
    ) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        Self::check_version(sessions.get(session.id()), session, expected_version)?;
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &AssessmentSessionId,
    ) -> Result<Option<AssessmentSession>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn find_active(
        &self,
        user_id: &UserId,
        instrument: InstrumentSlug,
    ) -> Result<Option<AssessmentSession>, DomainError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.is_active() && s.user_id() == user_id && s.instrument() == instrument)
            .cloned())
    }

    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AssessmentSession>, DomainError> {
        let mut active: Vec<AssessmentSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_active() && s.user_id() == user_id)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.started_at().cmp(a.started_at()));
        Ok(active)
    }

    async fn last_scored_at(
        &self,
        user_id: &UserId,
        instrument: InstrumentSlug,
    ) -> Result<Option<Timestamp>, DomainError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id() == user_id && s.instrument() == instrument)
            .filter_map(AssessmentSession::scored_at)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;
    use crate::domain::scoring::RawValue;

    fn user() -> UserId {
        UserId::new("caregiver-1").unwrap()
    }

    fn start() -> AssessmentSession {
        AssessmentSession::start(user(), InstrumentSlug::Ema, Timestamp::now())
    }

    #[tokio::test]
    async fn first_start_needs_no_prior_session() {
        let store = InMemoryAssessmentSessionStore::new();
        let session = start();

        store.replace_active(None, &session).await.unwrap();

        let found = store.find_active(&user(), InstrumentSlug::Ema).await.unwrap();
        assert_eq!(found.map(|s| *s.id()), Some(*session.id()));
    }

    #[tokio::test]
    async fn second_start_without_supersede_conflicts() {
        let store = InMemoryAssessmentSessionStore::new();
        store.replace_active(None, &start()).await.unwrap();

        let err = store.replace_active(None, &start()).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.count_for(&user(), InstrumentSlug::Ema).await, 1);
    }

    #[tokio::test]
    async fn supersede_swaps_active_session() {
        let store = InMemoryAssessmentSessionStore::new();
        let mut first = start();
        store.replace_active(None, &first).await.unwrap();

        first.supersede(Timestamp::now()).unwrap();
        let second = start();
        store.replace_active(Some(&first), &second).await.unwrap();

        let active = store.find_active_by_user(&user()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), second.id());
        let old = store.find_by_id(first.id()).await.unwrap().unwrap();
        assert!(!old.is_active());
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let store = InMemoryAssessmentSessionStore::new();
        let session = start();
        store.replace_active(None, &session).await.unwrap();

        let loaded = session.version();
        let mut a = session.clone();
        let mut b = session.clone();
        a.supersede(Timestamp::now()).unwrap();
        b.supersede(Timestamp::now()).unwrap();

        store.update(&a, loaded).await.unwrap();
        let err = store.update(&b, loaded).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrencyConflict);
    }

    #[tokio::test]
    async fn several_mutations_commit_against_loaded_version() {
        let store = InMemoryAssessmentSessionStore::new();
        let session = start();
        store.replace_active(None, &session).await.unwrap();

        let definition = Catalog::global().definition(InstrumentSlug::Ema);
        let mut edited = session.clone();
        edited
            .record_answer(definition, "ema_1", RawValue::Likert(3.0), Timestamp::now())
            .unwrap();
        edited.finalize(definition, Timestamp::now()).unwrap();

        store.update(&edited, session.version()).await.unwrap();
        let stored = store.find_by_id(session.id()).await.unwrap().unwrap();
        assert_eq!(stored.version(), session.version() + 2);
    }

    #[tokio::test]
    async fn update_of_unknown_session_is_not_found() {
        let store = InMemoryAssessmentSessionStore::new();
        let session = start();
        let err = store.update(&session, session.version()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn last_scored_ignores_superseded_sessions() {
        let store = InMemoryAssessmentSessionStore::new();
        let mut session = start();
        session.supersede(Timestamp::now()).unwrap();
        store.seed(session).await;

        let last = store.last_scored_at(&user(), InstrumentSlug::Ema).await.unwrap();
        assert_eq!(last, None);
    }
}
