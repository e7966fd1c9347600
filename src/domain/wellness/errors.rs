//! Wellness-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Profile and history errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WellnessError {
    /// An incoming zone value or composite is unusable.
    InvalidZoneValue(String),
    /// The profile kept changing underneath the merge.
    ConcurrencyConflict { attempts: u32 },
    /// Infrastructure error.
    Infrastructure(String),
}

impl WellnessError {
    pub fn invalid_zone_value(message: impl Into<String>) -> Self {
        WellnessError::InvalidZoneValue(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        WellnessError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WellnessError::InvalidZoneValue(_) => ErrorCode::ValidationFailed,
            WellnessError::ConcurrencyConflict { .. } => ErrorCode::ConcurrencyConflict,
            WellnessError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            WellnessError::InvalidZoneValue(msg) => format!("Invalid zone value: {}", msg),
            WellnessError::ConcurrencyConflict { attempts } => format!(
                "Profile changed concurrently; gave up after {} attempts",
                attempts
            ),
            WellnessError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for WellnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for WellnessError {}

impl From<ValidationError> for WellnessError {
    fn from(err: ValidationError) -> Self {
        WellnessError::InvalidZoneValue(err.to_string())
    }
}

impl From<DomainError> for WellnessError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => WellnessError::InvalidZoneValue(err.message),
            _ => WellnessError::Infrastructure(err.to_string()),
        }
    }
}
