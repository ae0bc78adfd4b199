// [apps/api/src/main.rs]
//! Entry point: load environment, open the store, wire the
//! coordinator and ingestion pipeline, spawn the background daemons,
//! serve the router.

use std::sync::Arc;

use aegis_api::config::AppConfig;
use aegis_api::state::AppState;
use aegis_domain_ingestion::{DuplicateConfig, IngestionPipeline};
use aegis_domain_lifecycle::{DeadlineSweepService, LifecycleCoordinator, ReconciliationService};
use aegis_domain_triage::{Classifier, GeminiClassifier};
use aegis_infra_store::DbClient;
use aegis_shared_telemetry::init_tracing;
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("aegis_api");

    let config = AppConfig::from_env()?;
    info!(port = config.port, "🛡️ [AEGIS_API]: booting");

    let db = DbClient::connect(&config.database_url, config.database_access_token.clone()).await?;

    let classifier: Option<Arc<dyn Classifier>> = config
        .gemini_api_key
        .clone()
        .map(|key| Arc::new(GeminiClassifier::new(key, config.gemini_model.clone())) as Arc<dyn Classifier>);

    let coordinator = LifecycleCoordinator::new(
        db.clone(),
        classifier.clone(),
        config.assignment_window_seconds,
        config.reject_cooldown_seconds,
    );

    let duplicate_config = DuplicateConfig {
        radius_m: config.duplicate_radius_m,
        window_seconds: config.duplicate_window_seconds,
        ..DuplicateConfig::default()
    };
    let ingestion = IngestionPipeline::new(None, duplicate_config);

    let state = AppState::new(db.clone(), config.clone(), coordinator, ingestion, classifier);

    DeadlineSweepService::new(db.clone(), state.coordinator.clone()).spawn_sweep_daemon().await;
    ReconciliationService::new(db).spawn_reconciliation_daemon().await;

    let router = aegis_api::build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("🚀 [AEGIS_API]: listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}
