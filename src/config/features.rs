//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Schedule proactive follow-ups when a stress spike is detected
    #[serde(default = "default_enable_spike_follow_ups")]
    pub enable_spike_follow_ups: bool,

    /// Show detailed error messages (disable in production!)
    #[serde(default)]
    pub verbose_errors: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_spike_follow_ups: default_enable_spike_follow_ups(),
            verbose_errors: false,
        }
    }
}

fn default_enable_spike_follow_ups() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_defaults() {
        let flags = FeatureFlags::default();
        assert!(flags.enable_spike_follow_ups);
        assert!(!flags.verbose_errors);
    }

    #[test]
    fn test_feature_flags_deserialization() {
        let json = r#"{ "enable_spike_follow_ups": false }"#;

        let flags: FeatureFlags = serde_json::from_str(json).unwrap();
        assert!(!flags.enable_spike_follow_ups);
        assert!(!flags.verbose_errors);
    }
}
