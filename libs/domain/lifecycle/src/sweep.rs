// [libs/domain/lifecycle/src/sweep.rs]
/*!
 * Acceptance-deadline sweep: every ≤30s, reject any
 * `PendingAssignment` incident whose window has expired and ask the
 * Coordinator to re-rank. A `tokio::time::interval` with
 * `MissedTickBehavior::Skip` so a slow tick never queues up a
 * backlog of redundant scans.
 */

use std::sync::Arc;
use std::time::Duration;

use aegis_domain_assignment::CandidateRanker;
use aegis_domain_models::CoreError;
use aegis_infra_store::{DbClient, IncidentRepository};
use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::coordinator::LifecycleCoordinator;

const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 15;

pub struct DeadlineSweepService<R: CandidateRanker> {
    db: DbClient,
    coordinator: Arc<LifecycleCoordinator<R>>,
    interval_seconds: u64,
    incidents: IncidentRepository,
}

impl<R: CandidateRanker + Send + Sync + 'static> DeadlineSweepService<R> {
    pub fn new(db: DbClient, coordinator: Arc<LifecycleCoordinator<R>>) -> Self {
        Self::with_interval(db, coordinator, DEFAULT_SWEEP_INTERVAL_SECONDS)
    }

    pub fn with_interval(db: DbClient, coordinator: Arc<LifecycleCoordinator<R>>, interval_seconds: u64) -> Self {
        Self { db, coordinator, interval_seconds, incidents: IncidentRepository::new() }
    }

    #[instrument(skip(self))]
    pub async fn spawn_sweep_daemon(self) {
        let mut ticker = interval(Duration::from_secs(self.interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("⏰ [DEADLINE_SWEEP]: active. Interval: {}s", self.interval_seconds);

        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                match self.run_once().await {
                    Ok(0) => debug!("🧹 [DEADLINE_SWEEP]: no expired assignment windows"),
                    Ok(count) => info!("🧹 [DEADLINE_SWEEP]: expired {} assignment window(s)", count),
                    Err(e) => error!("💥 [DEADLINE_SWEEP_FAULT]: {e}"),
                }
            }
        });
    }

    async fn run_once(&self) -> Result<usize, CoreError> {
        let connection = self.db.connection().map_err(CoreError::from)?;
        let expired = self.incidents.list_expired_assignment_windows(&connection, Utc::now()).await?;

        let mut handled = 0;
        for incident in expired {
            match self.coordinator.deadline_expiry(&incident.id).await {
                Ok(_) => handled += 1,
                // A concurrent accept in the same tick already moved this
                // incident out of PendingAssignment; must not
                // double-reject an incident accepted in the same tick.
                Err(CoreError::InvalidState { .. }) => {
                    debug!("🏃 [DEADLINE_SWEEP]: incident {} already left pending_assignment, skipping", incident.id);
                }
                Err(e) => warn!("⚠️ [DEADLINE_SWEEP_ITEM_FAULT]: incident {} -> {e}", incident.id),
            }
        }
        Ok(handled)
    }
}
