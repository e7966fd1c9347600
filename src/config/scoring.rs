//! Scoring configuration

use serde::Deserialize;

use crate::domain::scoring::{EmptyResponsePolicy, ParsePolicy};

use super::error::ValidationError;

/// How inbound answer tokens are interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// `legacy_zero` keeps the historical empty-string-as-zero behavior.
    #[serde(default)]
    pub empty_response_policy: EmptyResponsePolicy,

    #[serde(default = "default_skip_tokens")]
    pub skip_tokens: Vec<String>,
}

impl ScoringConfig {
    pub fn parse_policy(&self) -> ParsePolicy {
        ParsePolicy {
            empty_response: self.empty_response_policy,
            skip_tokens: self.skip_tokens.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.skip_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(ValidationError::NoSkipTokens);
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            empty_response_policy: EmptyResponsePolicy::default(),
            skip_tokens: default_skip_tokens(),
        }
    }
}

fn default_skip_tokens() -> Vec<String> {
    ParsePolicy::default().skip_tokens
}
