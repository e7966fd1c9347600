//! Per-user pressure zone profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::PressureZone;
use crate::domain::foundation::{Timestamp, UserId, ValidationError};

use super::{ScoreHistoryEntry, ScoreTrigger};

/// Incoming per-zone values from one update.
pub type ZoneDeltas = BTreeMap<PressureZone, f64>;

/// Six canonical zones, each optionally scored 0-100.
///
/// Serialized as a map with all six keys; unscored zones are `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<PressureZone, Option<f64>>",
    into = "BTreeMap<PressureZone, Option<f64>>"
)]
pub struct PressureZoneProfile {
    values: [Option<f64>; 6],
}

impl PressureZoneProfile {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, zone: PressureZone) -> Option<f64> {
        self.values[zone.index()]
    }

    /// Zones that carry a value, in canonical order.
    pub fn scored(&self) -> impl Iterator<Item = (PressureZone, f64)> + '_ {
        PressureZone::ALL
            .into_iter()
            .filter_map(|zone| self.get(zone).map(|v| (zone, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Mean of the scored zones, rounded to one decimal place.
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .scored()
            .fold((0.0, 0usize), |(sum, count), (_, v)| (sum + v, count + 1));
        (count > 0).then(|| (sum / count as f64 * 10.0).round() / 10.0)
    }

    /// Returns a copy with every zone in `deltas` overwritten and all other
    /// zones carried over unchanged.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if any incoming value is outside 0-100 or not finite
    pub fn merge(&self, deltas: &ZoneDeltas) -> Result<Self, ValidationError> {
        let mut merged = *self;
        for (zone, value) in deltas {
            if !value.is_finite() || !(0.0..=100.0).contains(value) {
                return Err(ValidationError::out_of_range(zone.id(), 0.0, 100.0, *value));
            }
            merged.values[zone.index()] = Some(*value);
        }
        Ok(merged)
    }
}

impl From<BTreeMap<PressureZone, Option<f64>>> for PressureZoneProfile {
    fn from(map: BTreeMap<PressureZone, Option<f64>>) -> Self {
        let mut profile = Self::default();
        for (zone, value) in map {
            profile.values[zone.index()] = value;
        }
        profile
    }
}

impl From<PressureZoneProfile> for BTreeMap<PressureZone, Option<f64>> {
    fn from(profile: PressureZoneProfile) -> Self {
        PressureZone::ALL
            .into_iter()
            .map(|zone| (zone, profile.get(zone)))
            .collect()
    }
}

/// A user's current wellness state: zone profile plus latest composite.
///
/// The zone profile is only ever changed through [`PressureZoneProfile::merge`].
/// `version` is zero until the first write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessProfile {
    user_id: UserId,
    zones: PressureZoneProfile,
    composite: Option<f64>,
    last_trigger: Option<ScoreTrigger>,
    updated_at: Option<Timestamp>,
    version: u64,
}

impl WellnessProfile {
    /// A profile for a user with no score yet.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            zones: PressureZoneProfile::empty(),
            composite: None,
            last_trigger: None,
            updated_at: None,
            version: 0,
        }
    }

    /// Reconstitute a profile from persistence (no validation).
    pub fn reconstitute(
        user_id: UserId,
        zones: PressureZoneProfile,
        composite: Option<f64>,
        last_trigger: Option<ScoreTrigger>,
        updated_at: Option<Timestamp>,
        version: u64,
    ) -> Self {
        Self {
            user_id,
            zones,
            composite,
            last_trigger,
            updated_at,
            version,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn zones(&self) -> &PressureZoneProfile {
        &self.zones
    }

    pub fn composite(&self) -> Option<f64> {
        self.composite
    }

    pub fn last_trigger(&self) -> Option<ScoreTrigger> {
        self.last_trigger
    }

    pub fn updated_at(&self) -> Option<&Timestamp> {
        self.updated_at.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Applies an instrument result. The instrument's own composite is
    /// stored as-is rather than recomputed from the zones.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if a delta or the composite is outside 0-100
    pub fn apply_instrument_result(
        &mut self,
        deltas: &ZoneDeltas,
        new_composite: f64,
        trigger: ScoreTrigger,
        now: Timestamp,
    ) -> Result<ScoreHistoryEntry, ValidationError> {
        if !new_composite.is_finite() || !(0.0..=100.0).contains(&new_composite) {
            return Err(ValidationError::out_of_range(
                "composite",
                0.0,
                100.0,
                new_composite,
            ));
        }
        let merged = self.zones.merge(deltas)?;
        Ok(self.commit(merged, new_composite, trigger, now))
    }

    /// Applies one ad-hoc zone observation. With no instrument composite
    /// available, the stored composite becomes the mean of scored zones.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `value` is outside 0-100
    pub fn apply_observation(
        &mut self,
        zone: PressureZone,
        value: f64,
        now: Timestamp,
    ) -> Result<ScoreHistoryEntry, ValidationError> {
        let merged = self.zones.merge(&ZoneDeltas::from([(zone, value)]))?;
        let composite = merged.mean().unwrap_or(value);
        Ok(self.commit(merged, composite, ScoreTrigger::Observation, now))
    }

    fn commit(
        &mut self,
        zones: PressureZoneProfile,
        new_composite: f64,
        trigger: ScoreTrigger,
        now: Timestamp,
    ) -> ScoreHistoryEntry {
        let entry = ScoreHistoryEntry::new(
            self.user_id.clone(),
            self.composite,
            new_composite,
            zones,
            trigger,
            now,
        );

        self.zones = zones;
        self.composite = Some(new_composite);
        self.last_trigger = Some(trigger);
        self.updated_at = Some(now);
        self.version += 1;

        entry
    }
}
