//! In-process adapters for every persistence and collaborator port.
//!
//! Used by the binary when no external services are wired, and by tests.

mod follow_up;
mod outreach_gate;
mod session_store;
mod wellness_store;

pub use follow_up::{InMemoryFollowUpLedger, LoggingFollowUpScheduler, ScheduledFollowUp};
pub use outreach_gate::InMemoryOutreachGate;
pub use session_store::InMemoryAssessmentSessionStore;
pub use wellness_store::InMemoryWellnessStore;
