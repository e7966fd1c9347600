//! Assessment-specific error types.

use chrono::Duration;

use crate::domain::catalog::{CatalogError, InstrumentSlug};
use crate::domain::foundation::{AssessmentSessionId, DomainError, ErrorCode, Timestamp};

const SECONDS_PER_DAY: i64 = 86_400;

/// Assessment lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentError {
    /// Slug is not in the catalog.
    UnknownInstrument(String),
    /// The instrument was scored too recently for this user.
    CooldownActive {
        instrument: InstrumentSlug,
        remaining: Duration,
        available_at: Timestamp,
    },
    /// Session does not exist, belongs to someone else, or is completed.
    NoActiveSession(AssessmentSessionId),
    /// Question id is not part of the instrument.
    UnknownQuestion {
        instrument: InstrumentSlug,
        question_id: String,
    },
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Lost an optimistic-locking race more times than allowed.
    ConcurrencyConflict(String),
    /// Infrastructure error.
    Infrastructure(String),
}

impl AssessmentError {
    pub fn unknown_instrument(slug: impl Into<String>) -> Self {
        AssessmentError::UnknownInstrument(slug.into())
    }

    pub fn cooldown_active(
        instrument: InstrumentSlug,
        remaining: Duration,
        available_at: Timestamp,
    ) -> Self {
        AssessmentError::CooldownActive {
            instrument,
            remaining,
            available_at,
        }
    }

    pub fn no_active_session(id: AssessmentSessionId) -> Self {
        AssessmentError::NoActiveSession(id)
    }

    pub fn unknown_question(instrument: InstrumentSlug, question_id: impl Into<String>) -> Self {
        AssessmentError::UnknownQuestion {
            instrument,
            question_id: question_id.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AssessmentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        AssessmentError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AssessmentError::UnknownInstrument(_) => ErrorCode::UnknownInstrument,
            AssessmentError::CooldownActive { .. } => ErrorCode::CooldownActive,
            AssessmentError::NoActiveSession(_) => ErrorCode::NoActiveSession,
            AssessmentError::UnknownQuestion { .. } => ErrorCode::UnknownQuestion,
            AssessmentError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            AssessmentError::ConcurrencyConflict(_) => ErrorCode::ConcurrencyConflict,
            AssessmentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Whole days until a retake is allowed, rounded up. Zero when not cooling down.
    pub fn retry_after_days(&self) -> i64 {
        match self {
            AssessmentError::CooldownActive { remaining, .. } => {
                let secs = remaining.num_seconds().max(1);
                (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
            }
            _ => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AssessmentError::UnknownInstrument(slug) => format!("Unknown instrument: '{}'", slug),
            AssessmentError::CooldownActive { instrument, .. } => {
                let days = self.retry_after_days();
                format!(
                    "The {} assessment was taken recently; retake in {} day{}",
                    instrument,
                    days,
                    if days == 1 { "" } else { "s" }
                )
            }
            AssessmentError::NoActiveSession(id) => format!("No active assessment session: {}", id),
            AssessmentError::UnknownQuestion {
                instrument,
                question_id,
            } => format!("Question '{}' is not part of {}", question_id, instrument),
            AssessmentError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            AssessmentError::ConcurrencyConflict(msg) => format!("Conflict: {}", msg),
            AssessmentError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for AssessmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AssessmentError {}

impl From<CatalogError> for AssessmentError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownInstrument(slug) => AssessmentError::UnknownInstrument(slug),
        }
    }
}

impl From<DomainError> for AssessmentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => AssessmentError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::ConcurrencyConflict => AssessmentError::ConcurrencyConflict(err.message),
            _ => AssessmentError::Infrastructure(err.to_string()),
        }
    }
}
