// [apps/dispatch-worker/src/main.rs]
//! Entry point: load environment, open the store, build the sink
//! client, hand off to the worker pool.

use aegis_dispatch_worker::{DispatchWorkerPool, WorkerConfig};
use aegis_infra_dispatch_client::DispatchSinkClient;
use aegis_infra_store::DbClient;
use aegis_shared_telemetry::init_tracing;
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("aegis_dispatch_worker");

    let config = WorkerConfig::from_env()?;
    info!(workers = config.worker_count, "🚚 [DISPATCH_WORKER]: booting");

    let db = DbClient::connect(&config.database_url, config.database_access_token.clone()).await?;
    let sink = DispatchSinkClient::new(config.ticket_creation_endpoint.clone(), config.ticket_endpoint_auth_token.clone());

    let pool = DispatchWorkerPool::new(db, sink, config);
    pool.run().await;

    Ok(())
}
