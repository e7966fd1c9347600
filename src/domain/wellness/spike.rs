//! Stress spike rules.
//!
//! The pure checks live here. Crisis history, consent and the per-day
//! emission ledger belong to collaborators and are consulted by the
//! application layer, in the order listed on [`SpikeReason`].

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::PressureZoneProfile;

/// Why a spike evaluation did or did not schedule a follow-up.
///
/// Variants after `SpikeDetected` are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeReason {
    SpikeDetected,
    FeatureDisabled,
    BelowThreshold,
    NotIncreasing,
    FollowUpCooldown,
    RecentCrisis,
    NoConsent,
    AlreadyScheduledToday,
    CollaboratorUnavailable,
}

impl SpikeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpikeReason::SpikeDetected => "spike_detected",
            SpikeReason::FeatureDisabled => "feature_disabled",
            SpikeReason::BelowThreshold => "below_threshold",
            SpikeReason::NotIncreasing => "not_increasing",
            SpikeReason::FollowUpCooldown => "follow_up_cooldown",
            SpikeReason::RecentCrisis => "recent_crisis",
            SpikeReason::NoConsent => "no_consent",
            SpikeReason::AlreadyScheduledToday => "already_scheduled_today",
            SpikeReason::CollaboratorUnavailable => "collaborator_unavailable",
        }
    }
}

impl fmt::Display for SpikeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one spike evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeDecision {
    pub should_follow_up: bool,
    pub reason: SpikeReason,
    pub delta: f64,
}

impl SpikeDecision {
    pub fn follow_up(delta: f64) -> Self {
        Self {
            should_follow_up: true,
            reason: SpikeReason::SpikeDetected,
            delta,
        }
    }

    pub fn suppressed(reason: SpikeReason, delta: f64) -> Self {
        Self {
            should_follow_up: false,
            reason,
            delta,
        }
    }
}

/// Thresholds for spike detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikePolicy {
    pub enabled: bool,
    pub delta_threshold: f64,
    pub crisis_window_days: u32,
    pub follow_up_cooldown_days: u32,
}

impl Default for SpikePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            delta_threshold: 20.0,
            crisis_window_days: 7,
            follow_up_cooldown_days: 7,
        }
    }
}

impl SpikePolicy {
    pub fn follow_up_cooldown(&self) -> Duration {
        Duration::days(i64::from(self.follow_up_cooldown_days))
    }

    /// Runs the checks that need no collaborator: feature flag, delta
    /// threshold, strict increase and the follow-up cooldown.
    ///
    /// Returns the delta when every check passes. A missing old composite
    /// counts as 0.
    pub fn screen(
        &self,
        old_composite: Option<f64>,
        new_composite: f64,
        last_follow_up_at: Option<&Timestamp>,
        now: &Timestamp,
    ) -> Result<f64, SpikeDecision> {
        let old = old_composite.unwrap_or(0.0);
        let delta = new_composite - old;

        if !self.enabled {
            return Err(SpikeDecision::suppressed(SpikeReason::FeatureDisabled, delta));
        }
        if delta < self.delta_threshold {
            return Err(SpikeDecision::suppressed(SpikeReason::BelowThreshold, delta));
        }
        if new_composite <= old {
            return Err(SpikeDecision::suppressed(SpikeReason::NotIncreasing, delta));
        }
        if let Some(last) = last_follow_up_at {
            if now.duration_since(last) < self.follow_up_cooldown() {
                return Err(SpikeDecision::suppressed(SpikeReason::FollowUpCooldown, delta));
            }
        }
        Ok(delta)
    }
}

/// Data handed to the follow-up scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikePayload {
    pub old_composite: Option<f64>,
    pub new_composite: f64,
    pub delta: f64,
    pub zones: PressureZoneProfile,
}
