//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-process stores and collaborator stand-ins
//! - `http` - axum REST API over the wellness engine

pub mod http;
pub mod memory;

pub use memory::{
    InMemoryAssessmentSessionStore, InMemoryFollowUpLedger, InMemoryOutreachGate,
    InMemoryWellnessStore, LoggingFollowUpScheduler,
};
