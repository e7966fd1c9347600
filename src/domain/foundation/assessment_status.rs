//! AssessmentStatus enum for the lifecycle of an assessment session.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of an assessment session.
///
/// `none -> active -> completed`; the "none" state is the absence of a
/// session, so only the two persisted states are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    #[default]
    Active,
    Completed,
}

impl AssessmentStatus {
    /// Returns true if answers may still be recorded.
    pub fn is_active(&self) -> bool {
        matches!(self, AssessmentStatus::Active)
    }
}

impl StateMachine for AssessmentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AssessmentStatus::*;
        matches!((self, target), (Active, Completed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            AssessmentStatus::Active => vec![AssessmentStatus::Completed],
            AssessmentStatus::Completed => vec![],
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssessmentStatus::Active => "active",
            AssessmentStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}
