//! Raw answer tokens and how they are interpreted.

use serde::{Deserialize, Serialize};

/// What an empty or whitespace-only response turns into.
///
/// `LegacyZero` reproduces the historical behavior where an empty string was
/// coerced to the number 0. That value bypasses the scale range check, so
/// after reverse-scoring and rescaling it can push a composite outside
/// 0-100. The engine clamps the composite and flags it on the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResponsePolicy {
    #[default]
    LegacyZero,
    Skip,
}

/// Rules for turning an inbound token into a [`RawValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicy {
    pub empty_response: EmptyResponsePolicy,
    /// Tokens that mean "skip", compared case-insensitively after trimming.
    pub skip_tokens: Vec<String>,
}

impl Default for ParsePolicy {
    fn default() -> Self {
        Self {
            empty_response: EmptyResponsePolicy::default(),
            skip_tokens: vec!["SKIPPED".to_string(), "skip".to_string()],
        }
    }
}

impl ParsePolicy {
    fn is_skip_token(&self, token: &str) -> bool {
        self.skip_tokens
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(token))
    }
}

/// One submitted response, as recorded on a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawValue {
    /// Explicit skip marker.
    Skip,
    /// A finite number. May still be outside the scale.
    Likert(f64),
    /// Empty response coerced to 0 under [`EmptyResponsePolicy::LegacyZero`].
    CoercedEmpty,
    /// Anything else. Scored as a skip.
    Unparseable(String),
}

impl RawValue {
    /// Interprets a textual response.
    pub fn parse(token: &str, policy: &ParsePolicy) -> Self {
        let trimmed = token.trim();

        if trimmed.is_empty() {
            return match policy.empty_response {
                EmptyResponsePolicy::LegacyZero => RawValue::CoercedEmpty,
                EmptyResponsePolicy::Skip => RawValue::Skip,
            };
        }

        if policy.is_skip_token(trimmed) {
            return RawValue::Skip;
        }

        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => RawValue::Likert(v),
            _ => RawValue::Unparseable(token.to_string()),
        }
    }

    /// Wraps a numeric response. Non-finite numbers are unparseable.
    pub fn from_number(value: f64) -> Self {
        if value.is_finite() {
            RawValue::Likert(value)
        } else {
            RawValue::Unparseable(value.to_string())
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, RawValue::Skip)
    }
}
