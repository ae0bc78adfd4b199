// [libs/domain/lifecycle/src/reconcile.rs]
/*!
 * Hourly invariant-reconciliation job. Read-mostly: recomputes
 * `current_load` for every organisation and division directly from
 * incident rows and corrects any drift, logging a discrepancy event
 * and an audit entry each time it has to.
 */

use std::time::Duration;

use aegis_domain_models::{AuditEvent, CoreError};
use aegis_infra_store::repositories::{AuditRepository, DivisionRepository, OrganisationRepository};
use aegis_infra_store::{DbClient, IncidentRepository};
use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

const DEFAULT_RECONCILE_INTERVAL_SECONDS: u64 = 3600;
const RECONCILER_PRINCIPAL: &str = "SYSTEM_RECONCILER";

pub struct ReconciliationService {
    db: DbClient,
    interval_seconds: u64,
    incidents: IncidentRepository,
    organisations: OrganisationRepository,
    divisions: DivisionRepository,
    audit: AuditRepository,
}

impl ReconciliationService {
    pub fn new(db: DbClient) -> Self {
        Self::with_interval(db, DEFAULT_RECONCILE_INTERVAL_SECONDS)
    }

    pub fn with_interval(db: DbClient, interval_seconds: u64) -> Self {
        Self {
            db,
            interval_seconds,
            incidents: IncidentRepository::new(),
            organisations: OrganisationRepository::new(),
            divisions: DivisionRepository::new(),
            audit: AuditRepository::new(),
        }
    }

    #[instrument(skip(self))]
    pub async fn spawn_reconciliation_daemon(self) {
        let mut ticker = interval(Duration::from_secs(self.interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("🧮 [RECONCILER]: active. Interval: {}s", self.interval_seconds);

        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!("💥 [RECONCILE_FAULT]: {e}");
                }
            }
        });
    }

    async fn run_once(&self) -> Result<(), CoreError> {
        let connection = self.db.connection().map_err(CoreError::from)?;

        for org in self.organisations.list_all(&connection).await? {
            let true_load = self.incidents.count_active_for_organisation(&connection, &org.id).await? as u32;
            if true_load != org.current_load {
                warn!(
                    "⚖️ [LOAD_DRIFT]: organisation {} recorded={} actual={}",
                    org.id, org.current_load, true_load
                );
                self.organisations.set_load(&connection, &org.id, true_load as i64).await?;
                self.append_discrepancy_audit(&connection, &org.id, "organisation_load_drift", org.current_load, true_load)
                    .await?;
            }
        }

        for division in self.divisions.list_all(&connection).await? {
            let true_load = self.incidents.count_active_for_division(&connection, &division.id).await? as u32;
            if true_load != division.current_load {
                warn!(
                    "⚖️ [LOAD_DRIFT]: division {} recorded={} actual={}",
                    division.id, division.current_load, true_load
                );
                self.divisions.set_load(&connection, &division.id, true_load as i64).await?;
                self.append_discrepancy_audit(&connection, &division.id, "division_load_drift", division.current_load, true_load)
                    .await?;
            }
        }

        Ok(())
    }

    async fn append_discrepancy_audit(
        &self,
        connection: &libsql::Connection,
        resource_id: &str,
        kind: &str,
        before: u32,
        after: u32,
    ) -> Result<(), CoreError> {
        let event = AuditEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            principal: RECONCILER_PRINCIPAL.to_string(),
            incident_id: resource_id.to_string(),
            kind: kind.to_string(),
            before: Some(serde_json::json!({ "current_load": before })),
            after: Some(serde_json::json!({ "current_load": after })),
        };
        self.audit.append(connection, &event).await?;
        Ok(())
    }
}
