//! Collaborator ports consulted before proactive outreach.
//!
//! Both are owned by other subsystems; this engine only asks.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Crisis-detection subsystem.
#[async_trait]
pub trait CrisisMonitor: Send + Sync {
    /// True if a crisis-type event was recorded for the user in the last
    /// `window_days` days.
    async fn has_recent_crisis_event(
        &self,
        user_id: &UserId,
        window_days: u32,
    ) -> Result<bool, DomainError>;
}

/// Consent / user-profile store.
#[async_trait]
pub trait OutreachConsent: Send + Sync {
    /// True if the user has standing consent for proactive outreach.
    async fn proactive_outreach_allowed(&self, user_id: &UserId) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_object_safe() {
        fn _crisis(_m: &dyn CrisisMonitor) {}
        fn _consent(_c: &dyn OutreachConsent) {}
    }
}
