//! Assessment catalog - static, versioned instrument definitions.
//!
//! Pure data with no dependencies on the rest of the engine. Scoring lives
//! in [`crate::domain::scoring`]; the catalog only describes questions,
//! scales, bucket membership, reverse-scoring and cooldowns.

mod definition;
mod instruments;
mod translation;
mod zone;

use thiserror::Error;

pub use definition::{AssessmentDefinition, InstrumentSlug, LikertScale, Normalization, Question};
pub use instruments::Catalog;
pub use translation::{canonical_zone, zones_for};
pub use zone::PressureZone;

/// Catalog lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown instrument: '{0}'")]
    UnknownInstrument(String),
}
