//! Wellness engine HTTP server backed by in-process adapters.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use caregiver_wellness::adapters::http::{api_router, WellnessHandlers};
use caregiver_wellness::adapters::memory::{
    InMemoryAssessmentSessionStore, InMemoryFollowUpLedger, InMemoryOutreachGate,
    InMemoryWellnessStore, LoggingFollowUpScheduler,
};
use caregiver_wellness::application::handlers::wellness::SpikeCollaborators;
use caregiver_wellness::application::{EngineDependencies, EngineSettings, WellnessEngine};
use caregiver_wellness::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    let wellness = Arc::new(InMemoryWellnessStore::new());
    let gate = Arc::new(InMemoryOutreachGate::new(true));
    let engine = WellnessEngine::new(
        EngineDependencies {
            sessions: Arc::new(InMemoryAssessmentSessionStore::new()),
            profiles: wellness.clone(),
            history: wellness,
            outreach: SpikeCollaborators {
                crisis: gate.clone(),
                consent: gate,
                scheduler: Arc::new(LoggingFollowUpScheduler::new()),
                ledger: Arc::new(InMemoryFollowUpLedger::new()),
            },
        },
        EngineSettings {
            parse_policy: config.scoring.parse_policy(),
            spike_policy: config.spike_policy(),
            max_merge_attempts: config.aggregator.max_merge_attempts,
        },
    );

    let app = api_router(
        WellnessHandlers::new(engine, config.features.verbose_errors),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        environment = ?config.server.environment,
        empty_response_policy = ?config.scoring.empty_response_policy,
        spike_follow_ups = config.features.enable_spike_follow_ups,
        "Wellness engine listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
