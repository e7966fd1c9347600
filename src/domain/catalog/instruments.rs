//! Built-in instrument definitions and the process-wide catalog.

use chrono::Duration;
use once_cell::sync::Lazy;

use super::{AssessmentDefinition, CatalogError, InstrumentSlug, Normalization, Question};

const DEFINITION_VERSION: &str = "1.0";

static GLOBAL_CATALOG: Lazy<Catalog> = Lazy::new(Catalog::builtin);

/// Read-only registry of instrument definitions.
#[derive(Debug)]
pub struct Catalog {
    definitions: Vec<AssessmentDefinition>,
}

impl Catalog {
    /// The catalog shared by the whole process, built on first use.
    pub fn global() -> &'static Catalog {
        &GLOBAL_CATALOG
    }

    fn builtin() -> Self {
        Self {
            definitions: vec![ema(), sdoh()],
        }
    }

    /// Looks up a definition by its string slug.
    ///
    /// # Errors
    ///
    /// - `UnknownInstrument` if the slug is not in the catalog
    pub fn get_definition(&self, slug: &str) -> Result<&AssessmentDefinition, CatalogError> {
        let slug: InstrumentSlug = slug.parse()?;
        Ok(self.definition(slug))
    }

    /// Definition for a known slug.
    pub fn definition(&self, slug: InstrumentSlug) -> &AssessmentDefinition {
        self.definitions
            .iter()
            .find(|d| d.slug() == slug)
            .unwrap_or_else(|| unreachable!("built-in catalog covers every InstrumentSlug"))
    }

    pub fn definitions(&self) -> &[AssessmentDefinition] {
        &self.definitions
    }
}

/// EMA: daily stress pulse. Higher effective values mean more pressure.
fn ema() -> AssessmentDefinition {
    let questions = vec![
        Question::new(
            "ema_1",
            "On a scale of 1-5, how stressed have you felt today? (1=not at all, 5=extremely)",
            "emotional",
        ),
        Question::new("ema_2", "How's your mood been? (1=very down, 5=very up)", "emotional")
            .reversed(),
        Question::new(
            "ema_3",
            "How much support do you feel you have right now? (1=none, 5=a lot)",
            "support",
        )
        .reversed(),
    ];

    AssessmentDefinition::new(
        InstrumentSlug::Ema,
        DEFINITION_VERSION,
        "Daily Check-In",
        "Quick 3-question check-in to track how you're feeling",
        questions,
        Duration::days(1),
        Normalization::ScaleBounded,
    )
    .unwrap_or_else(|e| panic!("built-in EMA definition is invalid: {}", e))
}

/// SDOH-28: social determinants screen, retaken monthly.
fn sdoh() -> AssessmentDefinition {
    let questions = vec![
        // Relationship & social support
        Question::new("sdoh_1", "I have people I can rely on for emotional support. (1=never, 5=always)", "social").reversed(),
        Question::new("sdoh_2", "I feel connected to my community. (1=never, 5=always)", "social").reversed(),
        Question::new("sdoh_3", "I have someone to help in an emergency. (1=never, 5=always)", "social").reversed(),
        Question::new("sdoh_4", "I can talk to others about my caregiving challenges. (1=never, 5=always)", "social").reversed(),
        Question::new("sdoh_5", "I feel supported by family and friends. (1=never, 5=always)", "social").reversed(),
        Question::new("sdoh_6", "I have people who understand what I'm going through. (1=never, 5=always)", "social").reversed(),
        Question::new("sdoh_7", "I can ask for help when I need it. (1=never, 5=always)", "social").reversed(),
        Question::new("sdoh_8", "I participate in social activities. (1=never, 5=always)", "social").reversed(),
        // Housing & environment
        Question::new("sdoh_9", "My housing is stable and secure. (1=never, 5=always)", "housing").reversed(),
        Question::new("sdoh_10", "My home is safe and in good condition. (1=never, 5=always)", "housing").reversed(),
        Question::new("sdoh_11", "I worry about losing my housing. (1=never, 5=always)", "housing"),
        Question::new("sdoh_12", "My housing meets my caregiving needs. (1=never, 5=always)", "housing").reversed(),
        // Financial resources
        Question::new("sdoh_13", "I worry about having enough money for basic needs. (1=never, 5=always)", "financial"),
        Question::new("sdoh_14", "I have difficulty paying for medical care. (1=never, 5=always)", "financial"),
        Question::new("sdoh_15", "I have difficulty paying for medications. (1=never, 5=always)", "financial"),
        Question::new("sdoh_16", "I worry about housing costs. (1=never, 5=always)", "financial"),
        Question::new("sdoh_17", "I have difficulty paying for utilities. (1=never, 5=always)", "financial"),
        Question::new("sdoh_18", "I have difficulty paying for food. (1=never, 5=always)", "financial"),
        Question::new("sdoh_19", "Transportation costs are a burden. (1=never, 5=always)", "financial"),
        Question::new("sdoh_20", "I can afford internet/phone service. (1=never, 5=always)", "financial").reversed(),
        // Legal & navigation
        Question::new("sdoh_21", "I can easily communicate with healthcare providers. (1=never, 5=always)", "navigation").reversed(),
        Question::new("sdoh_22", "I understand the medical information I receive. (1=never, 5=always)", "navigation").reversed(),
        Question::new("sdoh_23", "I can coordinate care between multiple providers. (1=never, 5=always)", "navigation").reversed(),
        Question::new("sdoh_24", "I have access to medical records when needed. (1=never, 5=always)", "navigation").reversed(),
        Question::new("sdoh_25", "I have legal documents in order (power of attorney, etc.). (1=never, 5=always)", "navigation").reversed(),
        Question::new("sdoh_26", "I understand my rights as a caregiver. (1=never, 5=always)", "navigation").reversed(),
        // Emotional wellbeing
        Question::new("sdoh_27", "I feel prepared for caregiving emergencies. (1=never, 5=always)", "preparedness").reversed(),
        Question::new("sdoh_28", "I feel safe in my neighborhood. (1=never, 5=always)", "preparedness").reversed(),
    ];

    AssessmentDefinition::new(
        InstrumentSlug::Sdoh,
        DEFINITION_VERSION,
        "Social Needs Assessment",
        "28 questions about your social and economic needs",
        questions,
        Duration::days(30),
        Normalization::FixedFive,
    )
    .unwrap_or_else(|e| panic!("built-in SDOH definition is invalid: {}", e))
}
