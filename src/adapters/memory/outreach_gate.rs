//! In-memory stand-ins for the crisis and consent collaborators.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::{CrisisMonitor, OutreachConsent};

/// Crisis events and consent flags kept in process memory.
///
/// Users without an explicit consent entry fall back to `default_consent`.
pub struct InMemoryOutreachGate {
    crisis_events: RwLock<HashMap<UserId, Vec<Timestamp>>>,
    consent: RwLock<HashMap<UserId, bool>>,
    default_consent: bool,
}

impl InMemoryOutreachGate {
    pub fn new(default_consent: bool) -> Self {
        Self {
            crisis_events: RwLock::new(HashMap::new()),
            consent: RwLock::new(HashMap::new()),
            default_consent,
        }
    }

    pub async fn record_crisis_event(&self, user_id: &UserId, at: Timestamp) {
        self.crisis_events
            .write()
            .await
            .entry(user_id.clone())
            .or_default()
            .push(at);
    }

    pub async fn set_consent(&self, user_id: &UserId, allowed: bool) {
        self.consent.write().await.insert(user_id.clone(), allowed);
    }
}

#[async_trait]
impl CrisisMonitor for InMemoryOutreachGate {
    async fn has_recent_crisis_event(
        &self,
        user_id: &UserId,
        window_days: u32,
    ) -> Result<bool, DomainError> {
        let cutoff = Timestamp::now().minus_days(i64::from(window_days));
        Ok(self
            .crisis_events
            .read()
            .await
            .get(user_id)
            .is_some_and(|events| events.iter().any(|at| at.is_after(&cutoff))))
    }
}

#[async_trait]
impl OutreachConsent for InMemoryOutreachGate {
    async fn proactive_outreach_allowed(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self
            .consent
            .read()
            .await
            .get(user_id)
            .copied()
            .unwrap_or(self.default_consent))
    }
}
