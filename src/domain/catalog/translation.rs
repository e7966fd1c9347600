//! Instrument bucket -> canonical zone lookup.
//!
//! Instruments use their own bucket vocabularies ("emotional", "support",
//! "housing", ...). Two instruments may reuse a word with a different
//! meaning, so translation is keyed by (instrument, bucket) and never by
//! string equality with a canonical zone.

use super::{InstrumentSlug, PressureZone};

const ZONE_TRANSLATION: &[(InstrumentSlug, &str, PressureZone)] = &[
    (InstrumentSlug::Ema, "emotional", PressureZone::P6),
    (InstrumentSlug::Ema, "support", PressureZone::P1),
    (InstrumentSlug::Sdoh, "social", PressureZone::P1),
    (InstrumentSlug::Sdoh, "housing", PressureZone::P3),
    (InstrumentSlug::Sdoh, "financial", PressureZone::P4),
    (InstrumentSlug::Sdoh, "navigation", PressureZone::P5),
    (InstrumentSlug::Sdoh, "preparedness", PressureZone::P6),
];

/// Canonical zone for an instrument's bucket, if the pair is mapped.
pub fn canonical_zone(instrument: InstrumentSlug, bucket: &str) -> Option<PressureZone> {
    ZONE_TRANSLATION
        .iter()
        .find(|(slug, name, _)| *slug == instrument && *name == bucket)
        .map(|(_, _, zone)| *zone)
}

/// Canonical zones an instrument can write.
pub fn zones_for(instrument: InstrumentSlug) -> Vec<PressureZone> {
    let mut zones: Vec<PressureZone> = ZONE_TRANSLATION
        .iter()
        .filter(|(slug, _, _)| *slug == instrument)
        .map(|(_, _, zone)| *zone)
        .collect();
    zones.sort();
    zones.dedup();
    zones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;

    #[test]
    fn every_catalog_bucket_is_translated() {
        for definition in Catalog::global().definitions() {
            for bucket in definition.zone_buckets() {
                assert!(
                    canonical_zone(definition.slug(), bucket).is_some(),
                    "{}::{} has no canonical zone",
                    definition.slug(),
                    bucket
                );
            }
        }
    }

    #[test]
    fn translation_is_per_instrument() {
        assert_eq!(canonical_zone(InstrumentSlug::Ema, "emotional"), Some(PressureZone::P6));
        assert_eq!(canonical_zone(InstrumentSlug::Sdoh, "emotional"), None);
    }

    #[test]
    fn physical_zone_is_not_written_by_instruments() {
        for slug in InstrumentSlug::ALL {
            assert!(!zones_for(slug).contains(&PressureZone::P2));
        }
    }

    #[test]
    fn sdoh_covers_five_zones() {
        assert_eq!(
            zones_for(InstrumentSlug::Sdoh),
            vec![
                PressureZone::P1,
                PressureZone::P3,
                PressureZone::P4,
                PressureZone::P5,
                PressureZone::P6
            ]
        );
    }
}
