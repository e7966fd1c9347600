//! In-memory follow-up ledger and a scheduler that only logs.

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::wellness::{SpikePayload, SpikeReason};
use crate::ports::{FollowUpClaim, FollowUpLedger, FollowUpScheduler};

/// Ledger of spike follow-up emissions. Only the latest claim per user is
/// kept; it is all the same-day and cooldown checks need.
#[derive(Default)]
pub struct InMemoryFollowUpLedger {
    last_claim: Mutex<HashMap<UserId, Timestamp>>,
}

impl InMemoryFollowUpLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FollowUpLedger for InMemoryFollowUpLedger {
    async fn last_follow_up_at(&self, user_id: &UserId) -> Result<Option<Timestamp>, DomainError> {
        Ok(self.last_claim.lock().await.get(user_id).copied())
    }

    async fn try_claim(
        &self,
        user_id: &UserId,
        at: Timestamp,
        cooldown: Duration,
    ) -> Result<FollowUpClaim, DomainError> {
        let mut last_claim = self.last_claim.lock().await;
        if let Some(last) = last_claim.get(user_id) {
            if last.utc_day() == at.utc_day() {
                return Ok(FollowUpClaim::SameDay);
            }
            if at.duration_since(last) < cooldown {
                return Ok(FollowUpClaim::InCooldown);
            }
        }
        last_claim.insert(user_id.clone(), at);
        Ok(FollowUpClaim::Claimed)
    }
}

/// A follow-up that was handed to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledFollowUp {
    pub user_id: UserId,
    pub reason: SpikeReason,
    pub payload: SpikePayload,
}

/// Scheduler that records and logs requests instead of delivering them.
#[derive(Default)]
pub struct LoggingFollowUpScheduler {
    scheduled: Mutex<Vec<ScheduledFollowUp>>,
}

impl LoggingFollowUpScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn scheduled(&self) -> Vec<ScheduledFollowUp> {
        self.scheduled.lock().await.clone()
    }
}

#[async_trait]
impl FollowUpScheduler for LoggingFollowUpScheduler {
    async fn schedule_follow_up(
        &self,
        user_id: &UserId,
        reason: SpikeReason,
        payload: &SpikePayload,
    ) -> Result<(), DomainError> {
        tracing::info!(
            user_id = %user_id,
            reason = %reason,
            old_composite = ?payload.old_composite,
            new_composite = payload.new_composite,
            delta = payload.delta,
            "Follow-up scheduled"
        );
        self.scheduled.lock().await.push(ScheduledFollowUp {
            user_id: user_id.clone(),
            reason,
            payload: payload.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wellness::PressureZoneProfile;
    use chrono::{TimeZone, Utc};

    fn user() -> UserId {
        UserId::new("caregiver-1").unwrap()
    }

    #[tokio::test]
    async fn second_claim_for_same_day_loses() {
        let ledger = InMemoryFollowUpLedger::new();
        let now = Timestamp::now();

        let first = ledger.try_claim(&user(), now, Duration::zero()).await.unwrap();
        let second = ledger.try_claim(&user(), now, Duration::zero()).await.unwrap();

        assert_eq!(first, FollowUpClaim::Claimed);
        assert_eq!(second, FollowUpClaim::SameDay);
        assert_eq!(ledger.last_follow_up_at(&user()).await.unwrap(), Some(now));
    }

    #[tokio::test]
    async fn claim_across_midnight_respects_cooldown() {
        let ledger = InMemoryFollowUpLedger::new();
        let before_midnight = Timestamp::from_datetime(
            Utc.with_ymd_and_hms(2026, 3, 9, 23, 58, 0).unwrap(),
        );
        let after_midnight = Timestamp::from_datetime(
            Utc.with_ymd_and_hms(2026, 3, 10, 0, 2, 0).unwrap(),
        );

        let first = ledger
            .try_claim(&user(), before_midnight, Duration::days(7))
            .await
            .unwrap();
        let second = ledger
            .try_claim(&user(), after_midnight, Duration::days(7))
            .await
            .unwrap();

        assert_eq!(first, FollowUpClaim::Claimed);
        assert_eq!(second, FollowUpClaim::InCooldown);
        assert_eq!(
            ledger.last_follow_up_at(&user()).await.unwrap(),
            Some(before_midnight)
        );
    }

    #[tokio::test]
    async fn claim_after_cooldown_replaces_previous() {
        let ledger = InMemoryFollowUpLedger::new();
        let now = Timestamp::now();
        let earlier = now.minus_days(8);

        ledger.try_claim(&user(), earlier, Duration::days(7)).await.unwrap();
        let claim = ledger.try_claim(&user(), now, Duration::days(7)).await.unwrap();

        assert_eq!(claim, FollowUpClaim::Claimed);
        assert_eq!(ledger.last_follow_up_at(&user()).await.unwrap(), Some(now));
        assert_eq!(ledger.last_claim.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn scheduler_records_requests() {
        let scheduler = LoggingFollowUpScheduler::new();
        let payload = SpikePayload {
            old_composite: Some(40.0),
            new_composite: 65.0,
            delta: 25.0,
            zones: PressureZoneProfile::empty(),
        };

        scheduler
            .schedule_follow_up(&user(), SpikeReason::SpikeDetected, &payload)
            .await
            .unwrap();

        let scheduled = scheduler.scheduled().await;
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].payload, payload);
    }
}
