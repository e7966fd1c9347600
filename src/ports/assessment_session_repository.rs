//! Assessment session repository port.
//!
//! Sessions are keyed by id and indexed by (user, instrument). Storage must
//! enforce at most one active session per (user, instrument) pair.
//!
//! # Optimistic locking
//!
//! Aggregates bump their `version` on every mutation. `update` is a
//! compare-and-swap on the version the caller loaded; any other stored
//! version fails the call with `ConcurrencyConflict` and nothing is written.

use async_trait::async_trait;

use crate::domain::assessment::AssessmentSession;
use crate::domain::catalog::InstrumentSlug;
use crate::domain::foundation::{AssessmentSessionId, DomainError, Timestamp, UserId};

#[async_trait]
pub trait AssessmentSessionRepository: Send + Sync {
    /// Atomically installs `started` as the active session for its
    /// (user, instrument) pair, writing `superseded` in the same step.
    ///
    /// `superseded` must be the currently stored active session (at its
    /// previous version). When it is `None` there must be no active session.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the active session changed meanwhile
    /// - `DatabaseError` on persistence failure
    async fn replace_active(
        &self,
        superseded: Option<&AssessmentSession>,
        started: &AssessmentSession,
    ) -> Result<(), DomainError>;

    /// Persists a mutated session if the stored copy is still at
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session was never stored
    /// - `ConcurrencyConflict` on a stale version
    async fn update(
        &self,
        session: &AssessmentSession,
        expected_version: u64,
    ) -> Result<(), DomainError>;

    async fn find_by_id(
        &self,
        id: &AssessmentSessionId,
    ) -> Result<Option<AssessmentSession>, DomainError>;

    /// The active session for a pair, if one exists.
    async fn find_active(
        &self,
        user_id: &UserId,
        instrument: InstrumentSlug,
    ) -> Result<Option<AssessmentSession>, DomainError>;

    /// Every active session for a user, most recently started first.
    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AssessmentSession>, DomainError>;

    /// When the pair was last scored. Superseded sessions do not count.
    async fn last_scored_at(
        &self,
        user_id: &UserId,
        instrument: InstrumentSlug,
    ) -> Result<Option<Timestamp>, DomainError>;
}
