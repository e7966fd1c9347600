//! Spike detector and aggregator configuration

use serde::Deserialize;

use crate::domain::wellness::SpikePolicy;

use super::error::ValidationError;

/// Thresholds for proactive follow-ups.
#[derive(Debug, Clone, Deserialize)]
pub struct SpikeConfig {
    /// Minimum composite increase, in points, that counts as a spike
    #[serde(default = "default_delta_threshold")]
    pub delta_threshold: f64,

    /// Crisis events within this many days suppress outreach
    #[serde(default = "default_window_days")]
    pub crisis_window_days: u32,

    /// Minimum days between two follow-ups for one user
    #[serde(default = "default_window_days")]
    pub follow_up_cooldown_days: u32,
}

impl SpikeConfig {
    /// Builds the domain policy; `enabled` comes from the feature flag.
    pub fn policy(&self, enabled: bool) -> SpikePolicy {
        SpikePolicy {
            enabled,
            delta_threshold: self.delta_threshold,
            crisis_window_days: self.crisis_window_days,
            follow_up_cooldown_days: self.follow_up_cooldown_days,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.delta_threshold > 0.0 && self.delta_threshold <= 100.0) {
            return Err(ValidationError::InvalidDeltaThreshold);
        }
        if self.crisis_window_days == 0 {
            return Err(ValidationError::InvalidWindow("crisis_window_days"));
        }
        if self.follow_up_cooldown_days == 0 {
            return Err(ValidationError::InvalidWindow("follow_up_cooldown_days"));
        }
        Ok(())
    }
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            delta_threshold: default_delta_threshold(),
            crisis_window_days: default_window_days(),
            follow_up_cooldown_days: default_window_days(),
        }
    }
}

fn default_delta_threshold() -> f64 {
    20.0
}

fn default_window_days() -> u32 {
    7
}

/// Profile merge settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Reload-and-merge attempts before a write conflict is surfaced
    #[serde(default = "default_max_merge_attempts")]
    pub max_merge_attempts: u32,
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_merge_attempts == 0 {
            return Err(ValidationError::InvalidMergeAttempts);
        }
        Ok(())
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_merge_attempts: default_max_merge_attempts(),
        }
    }
}

fn default_max_merge_attempts() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_domain_default() {
        assert_eq!(SpikeConfig::default().policy(true), SpikePolicy::default());
    }

    #[test]
    fn disabled_flag_flows_into_policy() {
        assert!(!SpikeConfig::default().policy(false).enabled);
    }

    #[test]
    fn threshold_bounds_are_enforced() {
        for bad in [0.0, -1.0, 100.5, f64::NAN] {
            let config = SpikeConfig {
                delta_threshold: bad,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidDeltaThreshold));
        }
    }

    #[test]
    fn zero_windows_are_rejected() {
        let config = SpikeConfig {
            crisis_window_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SpikeConfig {
            follow_up_cooldown_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_merge_attempts_are_rejected() {
        let config = AggregatorConfig {
            max_merge_attempts: 0,
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMergeAttempts));
    }
}
