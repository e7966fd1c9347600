//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) are kept apart from query handlers (read);
//! [`WellnessEngine`] composes them into the operations callers use.

mod engine;
pub mod handlers;

pub use engine::{
    AnswerInput, AnswerRecorded, AssessmentFinalized, EngineDependencies, EngineSettings,
    ProfileChange, WellnessEngine,
};
