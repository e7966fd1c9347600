//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `AssessmentSessionRepository` - Sessions with one-active-per-pair enforcement
//! - `WellnessProfileRepository` - Versioned profile write plus history append
//! - `ScoreHistoryReader` - Newest-first history queries
//!
//! ## Collaborator Ports
//!
//! - `CrisisMonitor` - Recent crisis events, owned by the crisis subsystem
//! - `OutreachConsent` - Standing consent for proactive outreach
//! - `FollowUpScheduler` - Fire-and-forget follow-up delivery
//! - `FollowUpLedger` - Emission claims enforcing one follow-up per day and the cooldown

mod assessment_session_repository;
mod follow_up;
mod outreach_gate;
mod score_history_reader;
mod wellness_profile_repository;

pub use assessment_session_repository::AssessmentSessionRepository;
pub use follow_up::{FollowUpClaim, FollowUpLedger, FollowUpScheduler};
pub use outreach_gate::{CrisisMonitor, OutreachConsent};
pub use score_history_reader::ScoreHistoryReader;
pub use wellness_profile_repository::WellnessProfileRepository;
