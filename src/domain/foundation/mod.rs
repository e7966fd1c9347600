//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the wellness engine.

mod assessment_status;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use assessment_status::AssessmentStatus;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AssessmentSessionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
