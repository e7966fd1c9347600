//! Integration tests for the wellness engine.
//!
//! These drive the public engine operations end to end through the
//! in-memory adapters:
//! 1. Session lifecycle (start, supersede, cooldown, answer, finalize)
//! 2. Profile aggregation and history
//! 3. Spike follow-ups

use std::sync::Arc;

use caregiver_wellness::adapters::memory::{
    InMemoryAssessmentSessionStore, InMemoryFollowUpLedger, InMemoryOutreachGate,
    InMemoryWellnessStore, LoggingFollowUpScheduler,
};
use caregiver_wellness::application::handlers::wellness::SpikeCollaborators;
use caregiver_wellness::application::{EngineDependencies, EngineSettings, WellnessEngine};
use caregiver_wellness::domain::assessment::AssessmentError;
use caregiver_wellness::domain::catalog::{Catalog, InstrumentSlug, PressureZone};
use caregiver_wellness::domain::foundation::{AssessmentStatus, Timestamp, UserId};
use caregiver_wellness::domain::scoring::Band;
use caregiver_wellness::domain::wellness::{ScoreTrigger, SpikeReason};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestEngine {
    engine: WellnessEngine,
    sessions: Arc<InMemoryAssessmentSessionStore>,
    wellness: Arc<InMemoryWellnessStore>,
    gate: Arc<InMemoryOutreachGate>,
    scheduler: Arc<LoggingFollowUpScheduler>,
}

fn test_engine() -> TestEngine {
    let sessions = Arc::new(InMemoryAssessmentSessionStore::new());
    let wellness = Arc::new(InMemoryWellnessStore::new());
    let gate = Arc::new(InMemoryOutreachGate::new(true));
    let scheduler = Arc::new(LoggingFollowUpScheduler::new());
    let engine = WellnessEngine::new(
        EngineDependencies {
            sessions: sessions.clone(),
            profiles: wellness.clone(),
            history: wellness.clone(),
            outreach: SpikeCollaborators {
                crisis: gate.clone(),
                consent: gate.clone(),
                scheduler: scheduler.clone(),
                ledger: Arc::new(InMemoryFollowUpLedger::new()),
            },
        },
        EngineSettings::default(),
    );
    TestEngine {
        engine,
        sessions,
        wellness,
        gate,
        scheduler,
    }
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

/// Answers every SDOH question with the same value.
async fn complete_sdoh(t: &TestEngine, user_id: &UserId, value: f64) -> Option<f64> {
    let started = t.engine.start_assessment(user_id, "sdoh").await.unwrap();
    let id = *started.session.id();
    let definition = Catalog::global().definition(InstrumentSlug::Sdoh);

    let mut composite = None;
    for question in definition.questions() {
        let recorded = t
            .engine
            .record_answer(user_id, id, &question.id, value)
            .await
            .unwrap();
        if recorded.completed() {
            composite = recorded.result.and_then(|r| r.composite_score);
        }
    }
    composite
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[tokio::test]
async fn unknown_instrument_is_rejected_without_side_effects() {
    let t = test_engine();
    let alice = user("alice");

    let err = t.engine.start_assessment(&alice, "phq9").await.unwrap_err();

    assert!(matches!(err, AssessmentError::UnknownInstrument(ref s) if s == "phq9"));
    assert!(t.engine.get_active_session(&alice, None).await.unwrap().is_none());
}

#[tokio::test]
async fn restarting_leaves_exactly_one_active_session() {
    let t = test_engine();
    let alice = user("alice");

    let first = t.engine.start_assessment(&alice, "sdoh").await.unwrap();
    let second = t.engine.start_assessment(&alice, "sdoh").await.unwrap();

    assert_eq!(second.superseded, Some(*first.session.id()));
    assert_eq!(t.sessions.count_for(&alice, InstrumentSlug::Sdoh).await, 2);
    let active = t
        .engine
        .get_active_session(&alice, Some("sdoh"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id(), second.session.id());

    // the superseded session no longer accepts answers
    let err = t
        .engine
        .record_answer(&alice, *first.session.id(), "sdoh_1", 3.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AssessmentError::NoActiveSession(_)));
}

#[tokio::test]
async fn superseding_does_not_start_a_cooldown() {
    let t = test_engine();
    let alice = user("alice");

    t.engine.start_assessment(&alice, "ema").await.unwrap();
    t.engine.start_assessment(&alice, "ema").await.unwrap();

    assert!(t.engine.start_assessment(&alice, "ema").await.is_ok());
}

#[tokio::test]
async fn completed_instrument_enters_cooldown() {
    let t = test_engine();
    let alice = user("alice");

    complete_sdoh(&t, &alice, 3.0).await;
    let err = t.engine.start_assessment(&alice, "sdoh").await.unwrap_err();

    match err {
        AssessmentError::CooldownActive {
            instrument,
            available_at,
            ..
        } => {
            assert_eq!(instrument, InstrumentSlug::Sdoh);
            assert!(available_at.is_after(&Timestamp::now().plus_days(29)));
        }
        other => panic!("expected cooldown, got {:?}", other),
    }
    // other instruments are unaffected
    assert!(t.engine.start_assessment(&alice, "ema").await.is_ok());
}

#[tokio::test]
async fn duplicate_answer_is_idempotent() {
    let t = test_engine();
    let alice = user("alice");
    let started = t.engine.start_assessment(&alice, "ema").await.unwrap();
    let id = *started.session.id();

    t.engine.record_answer(&alice, id, "ema_1", 2.0).await.unwrap();
    let retried = t.engine.record_answer(&alice, id, "ema_1", 2.0).await.unwrap();

    assert!(!retried.completed());
    assert_eq!(retried.session.current_index(), 1);
    assert_eq!(retried.session.answers().len(), 1);
}

#[tokio::test]
async fn unknown_question_is_rejected() {
    let t = test_engine();
    let alice = user("alice");
    let started = t.engine.start_assessment(&alice, "ema").await.unwrap();

    let err = t
        .engine
        .record_answer(&alice, *started.session.id(), "sdoh_1", 3.0)
        .await
        .unwrap_err();

    assert!(matches!(err, AssessmentError::UnknownQuestion { .. }));
}

#[tokio::test]
async fn other_users_cannot_touch_a_session() {
    let t = test_engine();
    let started = t.engine.start_assessment(&user("alice"), "ema").await.unwrap();

    let err = t
        .engine
        .record_answer(&user("mallory"), *started.session.id(), "ema_1", 3.0)
        .await
        .unwrap_err();

    assert!(matches!(err, AssessmentError::NoActiveSession(_)));
}

// =============================================================================
// Scoring and aggregation
// =============================================================================

#[tokio::test]
async fn neutral_sdoh_scores_sixty_in_every_zone_it_covers() {
    let t = test_engine();
    let alice = user("alice");

    let composite = complete_sdoh(&t, &alice, 3.0).await;

    assert_eq!(composite, Some(60.0));
    let profile = t.engine.get_current_profile(&alice).await.unwrap();
    for zone in [
        PressureZone::P1,
        PressureZone::P3,
        PressureZone::P4,
        PressureZone::P5,
        PressureZone::P6,
    ] {
        assert_eq!(profile.zones().get(zone), Some(60.0), "zone {}", zone);
    }
    assert_eq!(profile.zones().get(PressureZone::P2), None);
    assert_eq!(profile.last_trigger(), Some(ScoreTrigger::Sdoh));
}

#[tokio::test]
async fn skipped_answers_lower_confidence_not_score() {
    let t = test_engine();
    let alice = user("alice");
    let started = t.engine.start_assessment(&alice, "ema").await.unwrap();
    let id = *started.session.id();

    t.engine.record_answer(&alice, id, "ema_1", "SKIPPED").await.unwrap();
    t.engine.record_answer(&alice, id, "ema_2", "skip").await.unwrap();
    let done = t.engine.record_answer(&alice, id, "ema_3", 2.0).await.unwrap();

    let result = done.result.unwrap();
    // support is reverse-scored: raw 2 -> 4 -> (4-1)/4 = 75
    assert_eq!(result.composite_score, Some(75.0));
    assert!((result.confidence - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(result.band, Some(Band::Moderate));
}

#[tokio::test]
async fn legacy_empty_answer_is_clamped_and_flagged() {
    let t = test_engine();
    let alice = user("alice");
    let started = t.engine.start_assessment(&alice, "ema").await.unwrap();
    let id = *started.session.id();

    t.engine.record_answer(&alice, id, "ema_1", "SKIPPED").await.unwrap();
    t.engine.record_answer(&alice, id, "ema_2", "").await.unwrap();
    let done = t.engine.record_answer(&alice, id, "ema_3", "SKIPPED").await.unwrap();

    let result = done.result.unwrap();
    assert_eq!(result.coerced_empty_answers, 1);
    assert!(result.clamped);
    let composite = result.composite_score.unwrap();
    assert!((0.0..=100.0).contains(&composite));
}

#[tokio::test]
async fn instruments_merge_into_one_profile_and_history() {
    let t = test_engine();
    let alice = user("alice");

    complete_sdoh(&t, &alice, 3.0).await;
    let started = t.engine.start_assessment(&alice, "ema").await.unwrap();
    let id = *started.session.id();
    t.engine.record_answer(&alice, id, "ema_1", 1.0).await.unwrap();
    t.engine.record_answer(&alice, id, "ema_2", 5.0).await.unwrap();
    let done = t.engine.record_answer(&alice, id, "ema_3", 5.0).await.unwrap();

    let change = done.change.unwrap();
    assert_eq!(change.entry.old_composite, Some(60.0));
    assert_eq!(change.entry.new_composite, 0.0);

    let profile = t.engine.get_current_profile(&alice).await.unwrap();
    assert_eq!(profile.zones().get(PressureZone::P6), Some(0.0));
    assert_eq!(profile.zones().get(PressureZone::P1), Some(0.0));
    assert_eq!(profile.zones().get(PressureZone::P4), Some(60.0));

    let history = t.engine.get_history(&alice, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].trigger, ScoreTrigger::Ema);
    assert_eq!(history[1].trigger, ScoreTrigger::Sdoh);
}

#[tokio::test]
async fn concurrent_instrument_and_observation_both_survive() {
    let t = test_engine();
    let alice = user("alice");
    let started = t.engine.start_assessment(&alice, "ema").await.unwrap();
    let id = *started.session.id();
    t.engine.record_answer(&alice, id, "ema_1", 4.0).await.unwrap();
    t.engine.record_answer(&alice, id, "ema_2", 2.0).await.unwrap();

    let (answer, observation) = tokio::join!(
        t.engine.record_answer(&alice, id, "ema_3", 2.0),
        t.engine.record_observation(&alice, PressureZone::P2, 55.0),
    );
    answer.unwrap();
    observation.unwrap();

    let profile = t.engine.get_current_profile(&alice).await.unwrap();
    assert_eq!(profile.zones().get(PressureZone::P2), Some(55.0));
    assert!(profile.zones().get(PressureZone::P6).is_some());
    assert!(profile.zones().get(PressureZone::P1).is_some());
    assert_eq!(t.wellness.history_len(&alice).await, 2);
}

#[tokio::test]
async fn finalize_early_scores_partial_session() {
    let t = test_engine();
    let alice = user("alice");
    let started = t.engine.start_assessment(&alice, "sdoh").await.unwrap();
    let id = *started.session.id();
    t.engine.record_answer(&alice, id, "sdoh_11", 5.0).await.unwrap();

    let finalized = t.engine.finalize_assessment(&alice, id).await.unwrap();

    assert_eq!(finalized.session.status(), AssessmentStatus::Completed);
    assert_eq!(finalized.result.answered_count, 1);
    assert!(finalized.change.is_some());
    assert!(t.engine.get_active_session(&alice, Some("sdoh")).await.unwrap().is_none());
}

// =============================================================================
// Spike follow-ups
// =============================================================================

#[tokio::test]
async fn jump_from_forty_to_sixty_five_schedules_once_per_day() {
    let t = test_engine();
    let alice = user("alice");

    // baseline write without consent so it cannot claim the day
    t.gate.set_consent(&alice, false).await;
    t.engine
        .record_observation(&alice, PressureZone::P2, 40.0)
        .await
        .unwrap();
    t.gate.set_consent(&alice, true).await;

    let spike = t
        .engine
        .record_observation(&alice, PressureZone::P2, 65.0)
        .await
        .unwrap();
    assert_eq!(spike.entry.old_composite, Some(40.0));
    assert!(spike.spike.should_follow_up);
    assert_eq!(spike.spike.delta, 25.0);

    // the same jump again later that day is not scheduled twice
    t.engine
        .record_observation(&alice, PressureZone::P2, 40.0)
        .await
        .unwrap();
    let again = t
        .engine
        .record_observation(&alice, PressureZone::P2, 65.0)
        .await
        .unwrap();

    assert!(!again.spike.should_follow_up);
    let scheduled = t.scheduler.scheduled().await;
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].payload.new_composite, 65.0);
}

#[tokio::test]
async fn recent_crisis_suppresses_follow_up() {
    let t = test_engine();
    let bob = user("bob");
    t.gate
        .record_crisis_event(&bob, Timestamp::now().minus_days(1))
        .await;

    let change = t
        .engine
        .record_observation(&bob, PressureZone::P6, 90.0)
        .await
        .unwrap();

    assert_eq!(change.spike.reason, SpikeReason::RecentCrisis);
    assert!(t.scheduler.scheduled().await.is_empty());
}

#[tokio::test]
async fn withdrawn_consent_suppresses_follow_up() {
    let t = test_engine();
    let bob = user("bob");
    t.gate.set_consent(&bob, false).await;

    let change = t
        .engine
        .record_observation(&bob, PressureZone::P6, 90.0)
        .await
        .unwrap();

    assert_eq!(change.spike.reason, SpikeReason::NoConsent);
    assert!(t.scheduler.scheduled().await.is_empty());
}
