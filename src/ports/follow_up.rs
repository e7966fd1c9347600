//! Follow-up scheduling ports.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::wellness::{SpikePayload, SpikeReason};

/// External notification/scheduler collaborator.
///
/// Fire-and-forget: callers log failures and never roll back on them.
#[async_trait]
pub trait FollowUpScheduler: Send + Sync {
    async fn schedule_follow_up(
        &self,
        user_id: &UserId,
        reason: SpikeReason,
        payload: &SpikePayload,
    ) -> Result<(), DomainError>;
}

/// Outcome of [`FollowUpLedger::try_claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpClaim {
    Claimed,
    /// A follow-up was already claimed on the same UTC day.
    SameDay,
    /// The previous follow-up is still inside the cooldown.
    InCooldown,
}

/// Record of spike follow-up emissions.
#[async_trait]
pub trait FollowUpLedger: Send + Sync {
    /// Time of the most recent claimed emission for the user.
    async fn last_follow_up_at(&self, user_id: &UserId) -> Result<Option<Timestamp>, DomainError>;

    /// Claims an emission at `at`.
    ///
    /// The check against the previous claim and the write are one atomic
    /// step: a claim fails if the previous one falls on the same UTC day or
    /// less than `cooldown` before `at`.
    async fn try_claim(
        &self,
        user_id: &UserId,
        at: Timestamp,
        cooldown: Duration,
    ) -> Result<FollowUpClaim, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_object_safe() {
        fn _scheduler(_s: &dyn FollowUpScheduler) {}
        fn _ledger(_l: &dyn FollowUpLedger) {}
    }
}
