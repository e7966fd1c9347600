//! Assessment session aggregate.
//!
//! A session is one administration of one instrument to one user. It is
//! never deleted: it either finishes with a score or is superseded when the
//! user starts the same instrument again.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{AssessmentDefinition, InstrumentSlug};
use crate::domain::foundation::{
    AssessmentSessionId, AssessmentStatus, DomainError, ErrorCode, StateMachine, Timestamp,
    UserId,
};
use crate::domain::scoring::{score, Answer, RawValue, ScoreResult};

/// How a completed session ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Completion {
    /// Finalized and scored. Starts the instrument cooldown.
    Scored {
        at: Timestamp,
        composite_score: Option<f64>,
    },
    /// Replaced by a newer session for the same instrument. Never scored.
    Superseded { at: Timestamp },
}

impl Completion {
    pub fn at(&self) -> Timestamp {
        match self {
            Completion::Scored { at, .. } | Completion::Superseded { at } => *at,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Completion::Scored { .. })
    }
}

/// Outcome of recording one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// First answer for this question; progress advanced.
    Appended,
    /// The question was already answered; the value was replaced.
    Overwritten,
}

/// Assessment session aggregate.
///
/// # Invariants
///
/// - answers hold at most one entry per question id
/// - `current_index` equals the number of distinct answered questions
/// - `completion` is set if and only if status is `Completed`
/// - `version` increases by one on every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSession {
    id: AssessmentSessionId,
    user_id: UserId,
    instrument: InstrumentSlug,
    status: AssessmentStatus,
    answers: Vec<Answer>,
    current_index: usize,
    completion: Option<Completion>,
    started_at: Timestamp,
    updated_at: Timestamp,
    version: u64,
}

impl AssessmentSession {
    /// Creates a fresh active session at question zero.
    pub fn start(user_id: UserId, instrument: InstrumentSlug, now: Timestamp) -> Self {
        Self {
            id: AssessmentSessionId::new(),
            user_id,
            instrument,
            status: AssessmentStatus::Active,
            answers: Vec::new(),
            current_index: 0,
            completion: None,
            started_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: AssessmentSessionId,
        user_id: UserId,
        instrument: InstrumentSlug,
        status: AssessmentStatus,
        answers: Vec<Answer>,
        completion: Option<Completion>,
        started_at: Timestamp,
        updated_at: Timestamp,
        version: u64,
    ) -> Self {
        let current_index = answers.len();
        Self {
            id,
            user_id,
            instrument,
            status,
            answers,
            current_index,
            completion,
            started_at,
            updated_at,
            version,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &AssessmentSessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn instrument(&self) -> InstrumentSlug {
        self.instrument
    }

    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Answers in first-submission order.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// When this session was scored, if it was.
    pub fn scored_at(&self) -> Option<Timestamp> {
        self.completion.filter(Completion::is_scored).map(|c| c.at())
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// First question in catalog order that has no answer yet.
    pub fn next_question_id<'a>(&self, definition: &'a AssessmentDefinition) -> Option<&'a str> {
        definition
            .questions()
            .iter()
            .find(|q| !self.answers.iter().any(|a| a.question_id == q.id))
            .map(|q| q.id.as_str())
    }

    /// True once every question of the instrument has an answer.
    pub fn all_answered(&self, definition: &AssessmentDefinition) -> bool {
        self.current_index >= definition.question_count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Records a response, replacing any earlier response to the same question.
    ///
    /// # Errors
    ///
    /// - `NoActiveSession` if the session is completed
    /// - `UnknownQuestion` if the question is not part of the instrument
    pub fn record_answer(
        &mut self,
        definition: &AssessmentDefinition,
        question_id: &str,
        value: RawValue,
        now: Timestamp,
    ) -> Result<AnswerOutcome, DomainError> {
        self.ensure_active()?;

        if definition.question(question_id).is_none() {
            return Err(DomainError::new(
                ErrorCode::UnknownQuestion,
                format!("Question '{}' is not part of {}", question_id, self.instrument),
            )
            .with_detail("question_id", question_id));
        }

        let outcome = match self.answers.iter_mut().find(|a| a.question_id == question_id) {
            Some(existing) => {
                existing.value = value;
                AnswerOutcome::Overwritten
            }
            None => {
                self.answers.push(Answer::new(question_id, value));
                self.current_index += 1;
                AnswerOutcome::Appended
            }
        };

        self.touch(now);
        Ok(outcome)
    }

    /// Scores the answers collected so far and completes the session.
    ///
    /// # Errors
    ///
    /// - `NoActiveSession` if the session is already completed
    pub fn finalize(
        &mut self,
        definition: &AssessmentDefinition,
        now: Timestamp,
    ) -> Result<ScoreResult, DomainError> {
        self.ensure_active()?;

        let result = score(&self.answers, definition);
        self.complete(Completion::Scored {
            at: now,
            composite_score: result.composite_score,
        })?;
        self.touch(now);
        Ok(result)
    }

    /// Completes the session without scoring it.
    ///
    /// # Errors
    ///
    /// - `NoActiveSession` if the session is already completed
    pub fn supersede(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.complete(Completion::Superseded { at: now })?;
        self.touch(now);
        Ok(())
    }

    fn complete(&mut self, completion: Completion) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(AssessmentStatus::Completed)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        self.completion = Some(completion);
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::NoActiveSession,
                format!("Assessment session {} is not active", self.id),
            ))
        }
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }
}

/// Time left before `instrument` may be started again, if any.
///
/// Only scored completions count. `None` means the user may start now.
pub fn cooldown_remaining(
    last_scored_at: Option<&Timestamp>,
    cooldown: Duration,
    now: &Timestamp,
) -> Option<Duration> {
    let elapsed = now.duration_since(last_scored_at?);
    (elapsed < cooldown).then(|| cooldown - elapsed)
}
