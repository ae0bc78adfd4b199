// [apps/api/src/state.rs]
//! Shared application state, composition-rooted once in `main` and
//! cloned cheaply into every handler. There's no maintenance-mode
//! switch anywhere in this surface, so `health_guard` here only ever
//! checks the database is reachable.

use std::sync::Arc;

use aegis_domain_assignment::WeightedRanker;
use aegis_domain_ingestion::IngestionPipeline;
use aegis_domain_lifecycle::LifecycleCoordinator;
use aegis_domain_triage::Classifier;
use aegis_infra_store::repositories::{
    AuditRepository, DispatchJobRepository, DivisionRepository, FacilityRepository, OrganisationRepository,
    StaffRepository,
};
use aegis_infra_store::{DbClient, IncidentRepository};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub config: Arc<AppConfig>,
    pub coordinator: Arc<LifecycleCoordinator<WeightedRanker>>,
    pub ingestion: Arc<IngestionPipeline>,
    pub classifier: Option<Arc<dyn Classifier>>,
    pub incidents: IncidentRepository,
    pub organisations: OrganisationRepository,
    pub divisions: DivisionRepository,
    pub staff: StaffRepository,
    pub facilities: FacilityRepository,
    pub audit: AuditRepository,
    pub dispatch_jobs: DispatchJobRepository,
}

impl AppState {
    pub fn new(
        db: DbClient,
        config: AppConfig,
        coordinator: LifecycleCoordinator<WeightedRanker>,
        ingestion: IngestionPipeline,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            coordinator: Arc::new(coordinator),
            ingestion: Arc::new(ingestion),
            classifier,
            incidents: IncidentRepository::new(),
            organisations: OrganisationRepository::new(),
            divisions: DivisionRepository::new(),
            staff: StaffRepository::new(),
            facilities: FacilityRepository::new(),
            audit: AuditRepository::new(),
            dispatch_jobs: DispatchJobRepository::new(),
        }
    }
}
