//! Assessment session domain module.
//!
//! Owns the `none -> active -> completed` lifecycle of one instrument
//! administration, answer recording (idempotent by question id), explicit
//! finalization, supersede-on-restart and the per-instrument cooldown rule.

mod aggregate;
mod errors;

pub use aggregate::{cooldown_remaining, AnswerOutcome, AssessmentSession, Completion};
pub use errors::AssessmentError;
