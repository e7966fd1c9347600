//! The scoring function.
//!
//! Converts one session's answers into bucket averages, a 0-100 composite,
//! a confidence value and a risk band. Pure: no I/O, no clock, no globals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::{canonical_zone, AssessmentDefinition, InstrumentSlug, PressureZone};

use super::{Band, RawValue, RiskLevel};

/// A response to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub value: RawValue,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, value: RawValue) -> Self {
        Self {
            question_id: question_id.into(),
            value,
        }
    }
}

/// Outcome of scoring one finalized session.
///
/// `composite_score`, `risk_level` and `band` are `None` exactly when no
/// usable answer exists; the zone maps are then empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub instrument: InstrumentSlug,
    pub composite_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub band: Option<Band>,
    /// Effective-Likert mean per instrument bucket.
    pub zone_averages: BTreeMap<String, f64>,
    pub zone_answer_counts: BTreeMap<String, usize>,
    /// Normalized 0-100 value per canonical zone, answered buckets only.
    pub canonical_zones: BTreeMap<PressureZone, f64>,
    pub confidence: f64,
    pub answered_count: usize,
    pub question_count: usize,
    /// The composite fell outside 0-100 and was pulled back in.
    pub clamped: bool,
    pub coerced_empty_answers: usize,
}

impl ScoreResult {
    pub fn has_usable_answers(&self) -> bool {
        self.composite_score.is_some()
    }
}

#[derive(Default, Clone, Copy)]
struct Tally {
    sum: f64,
    count: usize,
}

impl Tally {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Scores `answers` against `definition`.
///
/// Answers are matched to questions by id; when a question was answered more
/// than once the last answer wins. Skips, unparseable tokens and numbers
/// outside the scale contribute nothing. Legacy coerced empties count as 0.
pub fn score(answers: &[Answer], definition: &AssessmentDefinition) -> ScoreResult {
    let scale = definition.scale();
    let normalization = definition.normalization();

    let mut overall = Tally::default();
    let mut buckets: BTreeMap<String, Tally> = definition
        .zone_buckets()
        .into_iter()
        .map(|b| (b.to_string(), Tally::default()))
        .collect();
    let mut coerced_empty_answers = 0;

    for question in definition.questions() {
        let Some(answer) = answers.iter().rev().find(|a| a.question_id == question.id) else {
            continue;
        };

        let raw = match &answer.value {
            RawValue::Likert(v) if scale.contains(*v) => *v,
            RawValue::CoercedEmpty => {
                coerced_empty_answers += 1;
                0.0
            }
            _ => continue,
        };

        let effective = if question.reverse_scored {
            scale.reverse(raw)
        } else {
            raw
        };

        overall.add(effective);
        buckets.entry(question.zone.clone()).or_default().add(effective);
    }

    let question_count = definition.question_count();
    let confidence = if question_count == 0 {
        0.0
    } else {
        overall.count as f64 / question_count as f64
    };

    let Some(average) = overall.mean() else {
        return ScoreResult {
            instrument: definition.slug(),
            composite_score: None,
            risk_level: None,
            band: None,
            zone_averages: BTreeMap::new(),
            zone_answer_counts: BTreeMap::new(),
            canonical_zones: BTreeMap::new(),
            confidence,
            answered_count: 0,
            question_count,
            clamped: false,
            coerced_empty_answers,
        };
    };

    let unclamped = normalization.rescale(average, scale);
    let clamped = !(0.0..=100.0).contains(&unclamped);
    let composite = round_to_tenth(unclamped.clamp(0.0, 100.0));

    let zone_averages = buckets
        .iter()
        .map(|(name, tally)| (name.clone(), tally.mean().unwrap_or(0.0)))
        .collect();
    let zone_answer_counts = buckets
        .iter()
        .map(|(name, tally)| (name.clone(), tally.count))
        .collect();

    let mut weighted: BTreeMap<PressureZone, Tally> = BTreeMap::new();
    for (name, tally) in &buckets {
        let (Some(mean), Some(zone)) = (tally.mean(), canonical_zone(definition.slug(), name))
        else {
            continue;
        };
        let normalized = normalization.rescale(mean, scale).clamp(0.0, 100.0);
        let entry = weighted.entry(zone).or_default();
        entry.sum += normalized * tally.count as f64;
        entry.count += tally.count;
    }
    let canonical_zones = weighted
        .into_iter()
        .filter_map(|(zone, tally)| tally.mean().map(|v| (zone, round_to_tenth(v))))
        .collect();

    ScoreResult {
        instrument: definition.slug(),
        composite_score: Some(composite),
        risk_level: Some(RiskLevel::from_composite(composite)),
        band: Some(Band::from_composite(composite)),
        zone_averages,
        zone_answer_counts,
        canonical_zones,
        confidence,
        answered_count: overall.count,
        question_count,
        clamped,
        coerced_empty_answers,
    }
}
