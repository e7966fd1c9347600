//! EvaluateSpikeHandler - decides whether a composite jump earns a follow-up.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::wellness::{
    PressureZoneProfile, SpikeDecision, SpikePayload, SpikePolicy, SpikeReason,
};
use crate::ports::{
    CrisisMonitor, FollowUpClaim, FollowUpLedger, FollowUpScheduler, OutreachConsent,
};

/// Old and new composite for one profile update.
#[derive(Debug, Clone)]
pub struct EvaluateSpikeCommand {
    pub user_id: UserId,
    pub old_composite: Option<f64>,
    pub new_composite: f64,
    pub zones: PressureZoneProfile,
}

/// Collaborators consulted during evaluation.
#[derive(Clone)]
pub struct SpikeCollaborators {
    pub crisis: Arc<dyn CrisisMonitor>,
    pub consent: Arc<dyn OutreachConsent>,
    pub scheduler: Arc<dyn FollowUpScheduler>,
    pub ledger: Arc<dyn FollowUpLedger>,
}

/// Handler for spike evaluation.
///
/// Never fails. Collaborator errors suppress the follow-up and are logged;
/// a scheduling failure after a successful claim is logged and otherwise
/// ignored.
pub struct EvaluateSpikeHandler {
    collaborators: SpikeCollaborators,
    policy: SpikePolicy,
}

impl EvaluateSpikeHandler {
    pub fn new(collaborators: SpikeCollaborators, policy: SpikePolicy) -> Self {
        Self {
            collaborators,
            policy,
        }
    }

    pub fn policy(&self) -> &SpikePolicy {
        &self.policy
    }

    pub async fn handle(&self, cmd: EvaluateSpikeCommand) -> SpikeDecision {
        let decision = self.evaluate(&cmd).await;
        debug!(
            user_id = %cmd.user_id,
            old_composite = ?cmd.old_composite,
            new_composite = cmd.new_composite,
            should_follow_up = decision.should_follow_up,
            reason = %decision.reason,
            "Spike evaluated"
        );
        decision
    }

    async fn evaluate(&self, cmd: &EvaluateSpikeCommand) -> SpikeDecision {
        let c = &self.collaborators;
        let now = Timestamp::now();
        let unavailable = |err: DomainError, delta: f64| {
            warn!(user_id = %cmd.user_id, error = %err, "Spike collaborator unavailable");
            SpikeDecision::suppressed(SpikeReason::CollaboratorUnavailable, delta)
        };

        let last_follow_up = match c.ledger.last_follow_up_at(&cmd.user_id).await {
            Ok(last) => last,
            Err(err) => return unavailable(err, cmd.new_composite - cmd.old_composite.unwrap_or(0.0)),
        };

        let delta = match self.policy.screen(
            cmd.old_composite,
            cmd.new_composite,
            last_follow_up.as_ref(),
            &now,
        ) {
            Ok(delta) => delta,
            Err(decision) => return decision,
        };

        match c
            .crisis
            .has_recent_crisis_event(&cmd.user_id, self.policy.crisis_window_days)
            .await
        {
            Ok(false) => {}
            Ok(true) => return SpikeDecision::suppressed(SpikeReason::RecentCrisis, delta),
            Err(err) => return unavailable(err, delta),
        }

        match c.consent.proactive_outreach_allowed(&cmd.user_id).await {
            Ok(true) => {}
            Ok(false) => return SpikeDecision::suppressed(SpikeReason::NoConsent, delta),
            Err(err) => return unavailable(err, delta),
        }

        match c
            .ledger
            .try_claim(&cmd.user_id, now, self.policy.follow_up_cooldown())
            .await
        {
            Ok(FollowUpClaim::Claimed) => {}
            Ok(FollowUpClaim::SameDay) => {
                return SpikeDecision::suppressed(SpikeReason::AlreadyScheduledToday, delta)
            }
            Ok(FollowUpClaim::InCooldown) => {
                return SpikeDecision::suppressed(SpikeReason::FollowUpCooldown, delta)
            }
            Err(err) => return unavailable(err, delta),
        }

        let payload = SpikePayload {
            old_composite: cmd.old_composite,
            new_composite: cmd.new_composite,
            delta,
            zones: cmd.zones,
        };
        match c
            .scheduler
            .schedule_follow_up(&cmd.user_id, SpikeReason::SpikeDetected, &payload)
            .await
        {
            Ok(()) => info!(user_id = %cmd.user_id, delta, "Spike follow-up requested"),
            Err(err) => warn!(
                user_id = %cmd.user_id,
                error = %err,
                "Spike follow-up scheduling failed; leaving retry to the scheduler"
            ),
        }

        SpikeDecision::follow_up(delta)
    }
}
