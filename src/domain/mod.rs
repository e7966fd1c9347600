//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, status)
//! - `catalog` - Instrument definitions and the canonical zone table
//! - `scoring` - Pure scoring of answers into composite, bands and zones
//! - `assessment` - Assessment session lifecycle and cooldowns
//! - `wellness` - Zone profile, score history and spike rules

pub mod assessment;
pub mod catalog;
pub mod foundation;
pub mod scoring;
pub mod wellness;
