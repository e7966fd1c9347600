//! Risk level and band vocabularies.
//!
//! Both labels come from one threshold table so they can never disagree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical-style risk vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Crisis,
}

/// User-facing band vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    VeryLow,
    Low,
    Moderate,
    High,
}

/// Inclusive lower bound on the integer-rounded composite.
const THRESHOLDS: [(u8, RiskLevel, Band); 4] = [
    (0, RiskLevel::Low, Band::VeryLow),
    (26, RiskLevel::Moderate, Band::Low),
    (51, RiskLevel::High, Band::Moderate),
    (76, RiskLevel::Crisis, Band::High),
];

fn row(composite: f64) -> (RiskLevel, Band) {
    let rounded = composite.round().clamp(0.0, 100.0);
    let mut current = (THRESHOLDS[0].1, THRESHOLDS[0].2);
    for (lower, risk, band) in THRESHOLDS {
        if rounded >= f64::from(lower) {
            current = (risk, band);
        }
    }
    current
}

impl RiskLevel {
    pub fn from_composite(composite: f64) -> Self {
        row(composite).0
    }

    /// The band that shares this risk level's threshold row.
    pub fn band(&self) -> Band {
        THRESHOLDS
            .iter()
            .find(|(_, risk, _)| risk == self)
            .map(|(_, _, band)| *band)
            .unwrap_or(Band::VeryLow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Crisis => "crisis",
        }
    }
}

impl Band {
    pub fn from_composite(composite: f64) -> Self {
        row(composite).1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::VeryLow => "very_low",
            Band::Low => "low",
            Band::Moderate => "moderate",
            Band::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
