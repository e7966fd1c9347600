//! Scoring engine.
//!
//! Turns raw answers into a [`ScoreResult`]. Numeric edge cases (skips,
//! out-of-range values, legacy empty responses) are absorbed into the result
//! type and never surface as errors.

mod band;
mod engine;
mod raw_value;

pub use band::{Band, RiskLevel};
pub use engine::{score, Answer, ScoreResult};
pub use raw_value::{EmptyResponsePolicy, ParsePolicy, RawValue};
