//! Canonical pressure zones (P1-P6).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// One of the six canonical caregiver-stress dimensions every instrument
/// ultimately reports into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PressureZone {
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
}

impl PressureZone {
    /// All zones in canonical order.
    pub const ALL: [PressureZone; 6] = [
        PressureZone::P1,
        PressureZone::P2,
        PressureZone::P3,
        PressureZone::P4,
        PressureZone::P5,
        PressureZone::P6,
    ];

    /// Short identifier ("P1".."P6").
    pub fn id(&self) -> &'static str {
        match self {
            PressureZone::P1 => "P1",
            PressureZone::P2 => "P2",
            PressureZone::P3 => "P3",
            PressureZone::P4 => "P4",
            PressureZone::P5 => "P5",
            PressureZone::P6 => "P6",
        }
    }

    /// User-facing zone name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PressureZone::P1 => "Relationship & Social Support",
            PressureZone::P2 => "Physical Health",
            PressureZone::P3 => "Housing & Environment",
            PressureZone::P4 => "Financial Resources",
            PressureZone::P5 => "Legal & Navigation",
            PressureZone::P6 => "Emotional Wellbeing",
        }
    }

    /// Zero-based position in [`PressureZone::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PressureZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for PressureZone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PressureZone::ALL
            .iter()
            .copied()
            .find(|zone| zone.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ValidationError::invalid_format("zone", format!("'{}' is not one of P1-P6", s))
            })
    }
}
