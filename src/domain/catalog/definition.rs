//! Instrument definition types.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

use super::CatalogError;

/// Identifier of a supported instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentSlug {
    /// Daily three-question pulse check.
    Ema,
    /// 28-item social determinants screen.
    Sdoh,
}

impl InstrumentSlug {
    pub const ALL: [InstrumentSlug; 2] = [InstrumentSlug::Ema, InstrumentSlug::Sdoh];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentSlug::Ema => "ema",
            InstrumentSlug::Sdoh => "sdoh",
        }
    }
}

impl fmt::Display for InstrumentSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InstrumentSlug {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentSlug::ALL
            .iter()
            .copied()
            .find(|slug| slug.as_str() == s.trim())
            .ok_or_else(|| CatalogError::UnknownInstrument(s.to_string()))
    }
}

/// A 1..=points Likert scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikertScale {
    points: u8,
}

impl LikertScale {
    /// Standard five-point scale.
    pub const FIVE_POINT: LikertScale = LikertScale { points: 5 };

    /// Creates a scale with `points` options; needs at least two.
    pub fn new(points: u8) -> Result<Self, ValidationError> {
        if points < 2 {
            return Err(ValidationError::out_of_range(
                "scale",
                2.0,
                f64::from(u8::MAX),
                f64::from(points),
            ));
        }
        Ok(Self { points })
    }

    pub fn min(&self) -> f64 {
        1.0
    }

    pub fn max(&self) -> f64 {
        f64::from(self.points)
    }

    pub fn points(&self) -> u8 {
        self.points
    }

    /// True if `value` is a legal response on this scale.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// Inverts a response: `(scale + 1) - raw`.
    pub fn reverse(&self, raw: f64) -> f64 {
        (self.max() + 1.0) - raw
    }
}

/// How an instrument turns an average Likert value into a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `((avg - 1) / (scale - 1)) * 100`
    ScaleBounded,
    /// `avg * 20`, for instruments fixed at 1-5.
    FixedFive,
}

impl Normalization {
    /// Rescales an average to 0-100. The result is not clamped.
    pub fn rescale(&self, average: f64, scale: LikertScale) -> f64 {
        match self {
            Normalization::ScaleBounded => {
                ((average - scale.min()) / (scale.max() - scale.min())) * 100.0
            }
            Normalization::FixedFive => average * 20.0,
        }
    }
}

/// A single questionnaire item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Instrument-local bucket name; translated to a canonical zone elsewhere.
    pub zone: String,
    pub reverse_scored: bool,
    pub scale: LikertScale,
}

impl Question {
    pub fn new(id: &str, text: &str, zone: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            zone: zone.to_string(),
            reverse_scored: false,
            scale: LikertScale::FIVE_POINT,
        }
    }

    /// Marks the item as reverse-scored.
    pub fn reversed(mut self) -> Self {
        self.reverse_scored = true;
        self
    }
}

/// Immutable, versioned definition of one instrument.
///
/// # Invariants
///
/// - at least one question
/// - question ids are unique
/// - every question uses the same scale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentDefinition {
    slug: InstrumentSlug,
    version: &'static str,
    title: String,
    description: String,
    questions: Vec<Question>,
    #[serde(skip)]
    cooldown: Duration,
    normalization: Normalization,
}

impl AssessmentDefinition {
    /// Builds a definition, checking its invariants.
    pub fn new(
        slug: InstrumentSlug,
        version: &'static str,
        title: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<Question>,
        cooldown: Duration,
        normalization: Normalization,
    ) -> Result<Self, ValidationError> {
        let first = questions
            .first()
            .ok_or_else(|| ValidationError::empty_field("questions"))?;

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id.as_str()) {
                return Err(ValidationError::invalid_format(
                    "questions",
                    format!("duplicate question id '{}'", question.id),
                ));
            }
            if question.scale != first.scale {
                return Err(ValidationError::invalid_format(
                    "questions",
                    format!("question '{}' uses a different scale", question.id),
                ));
            }
        }

        Ok(Self {
            slug,
            version,
            title: title.into(),
            description: description.into(),
            questions,
            cooldown,
            normalization,
        })
    }

    pub fn slug(&self) -> InstrumentSlug {
        self.slug
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Minimum time between two scored administrations for one user.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Shared scale of every question.
    pub fn scale(&self) -> LikertScale {
        self.questions[0].scale
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Distinct bucket names, in first-appearance order.
    pub fn zone_buckets(&self) -> Vec<&str> {
        let mut buckets: Vec<&str> = Vec::new();
        for question in &self.questions {
            if !buckets.contains(&question.zone.as_str()) {
                buckets.push(&question.zone);
            }
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> Vec<Question> {
        vec![Question::new("q1", "One", "a"), Question::new("q2", "Two", "b")]
    }

    fn build(questions: Vec<Question>) -> Result<AssessmentDefinition, ValidationError> {
        AssessmentDefinition::new(
            InstrumentSlug::Ema,
            "1.0",
            "Test",
            "Test instrument",
            questions,
            Duration::days(1),
            Normalization::ScaleBounded,
        )
    }

    #[test]
    fn slug_parses_known_values() {
        assert_eq!("ema".parse::<InstrumentSlug>().unwrap(), InstrumentSlug::Ema);
        assert_eq!("sdoh".parse::<InstrumentSlug>().unwrap(), InstrumentSlug::Sdoh);
    }

    #[test]
    fn slug_rejects_unknown_value() {
        let err = "phq9".parse::<InstrumentSlug>().unwrap_err();
        assert!(matches!(err, CatalogError::UnknownInstrument(ref s) if s == "phq9"));
    }

    #[test]
    fn scale_reverse_inverts_endpoints() {
        let scale = LikertScale::FIVE_POINT;
        assert_eq!(scale.reverse(1.0), 5.0);
        assert_eq!(scale.reverse(5.0), 1.0);
        assert_eq!(scale.reverse(3.0), 3.0);
    }

    #[test]
    fn scale_rejects_single_point() {
        assert!(LikertScale::new(1).is_err());
        assert!(LikertScale::new(7).is_ok());
    }

    #[test]
    fn scale_bounded_normalization_spans_zero_to_hundred() {
        let scale = LikertScale::FIVE_POINT;
        assert_eq!(Normalization::ScaleBounded.rescale(1.0, scale), 0.0);
        assert_eq!(Normalization::ScaleBounded.rescale(4.0, scale), 75.0);
        assert_eq!(Normalization::ScaleBounded.rescale(5.0, scale), 100.0);
    }

    #[test]
    fn fixed_five_normalization_multiplies_by_twenty() {
        let scale = LikertScale::FIVE_POINT;
        assert_eq!(Normalization::FixedFive.rescale(1.0, scale), 20.0);
        assert_eq!(Normalization::FixedFive.rescale(4.0, scale), 80.0);
    }

    #[test]
    fn definition_rejects_duplicate_ids() {
        let questions = vec![Question::new("q1", "One", "a"), Question::new("q1", "Dup", "a")];
        assert!(build(questions).is_err());
    }

    #[test]
    fn definition_rejects_empty_questions() {
        assert!(build(vec![]).is_err());
    }

    #[test]
    fn definition_rejects_mixed_scales() {
        let mut questions = two_questions();
        questions[1].scale = LikertScale::new(7).unwrap();
        assert!(build(questions).is_err());
    }

    #[test]
    fn zone_buckets_are_distinct_and_ordered() {
        let mut questions = two_questions();
        questions.push(Question::new("q3", "Three", "a"));
        let def = build(questions).unwrap();
        assert_eq!(def.zone_buckets(), vec!["a", "b"]);
    }
}
