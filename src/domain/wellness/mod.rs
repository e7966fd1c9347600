//! Wellness domain module.
//!
//! The canonical six-zone profile attached to each user, the append-only
//! score history written alongside every profile change, and the rules for
//! deciding whether a composite jump is a stress spike.

mod errors;
mod history;
mod profile;
mod spike;

pub use errors::WellnessError;
pub use history::{ScoreHistoryEntry, ScoreTrigger};
pub use profile::{PressureZoneProfile, WellnessProfile, ZoneDeltas};
pub use spike::{SpikeDecision, SpikePayload, SpikePolicy, SpikeReason};
