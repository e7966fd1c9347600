//! Score history entries.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::InstrumentSlug;
use crate::domain::foundation::{Timestamp, UserId};

use super::PressureZoneProfile;

/// What caused a composite update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTrigger {
    /// Scheduled daily check-in.
    Ema,
    /// Scheduled social-needs screen.
    Sdoh,
    /// Ad-hoc single-zone observation.
    Observation,
}

impl ScoreTrigger {
    pub fn for_instrument(slug: InstrumentSlug) -> Self {
        match slug {
            InstrumentSlug::Ema => ScoreTrigger::Ema,
            InstrumentSlug::Sdoh => ScoreTrigger::Sdoh,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTrigger::Ema => "ema",
            ScoreTrigger::Sdoh => "sdoh",
            ScoreTrigger::Observation => "observation",
        }
    }
}

impl fmt::Display for ScoreTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record of one composite update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistoryEntry {
    pub user_id: UserId,
    /// Composite immediately before the write. `None` for a first score.
    pub old_composite: Option<f64>,
    pub new_composite: f64,
    pub zone_snapshot: PressureZoneProfile,
    pub trigger: ScoreTrigger,
    pub recorded_at: Timestamp,
}

impl ScoreHistoryEntry {
    pub fn new(
        user_id: UserId,
        old_composite: Option<f64>,
        new_composite: f64,
        zone_snapshot: PressureZoneProfile,
        trigger: ScoreTrigger,
        recorded_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            old_composite,
            new_composite,
            zone_snapshot,
            trigger,
            recorded_at,
        }
    }

    /// `new - old`, treating a missing old composite as 0.
    pub fn delta(&self) -> f64 {
        self.new_composite - self.old_composite.unwrap_or(0.0)
    }
}
