// [libs/domain/ingestion/src/lib.rs]
/*!
 * =================================================================
 * APARATO: MOBILE INGESTION PIPELINE (V1.0)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DOCUMENTO CRUDO -> DISPATCH JOB ENCOLADO
 *
 * Cinco etapas de anotación sobre un `IntakeDocument`: ninguna
 * falla detiene el pipeline, todas degradan a un valor por defecto y
 * el job siempre termina encolado.
 * =================================================================
 */

pub mod document;
pub mod enqueue;
pub mod modality;
pub mod normalise;
pub mod priority_lane;
pub mod verify_duplicate;
pub mod verify_fraud;
pub mod verify_weather;

pub use document::{IntakeAnnotations, IntakeDocument, RawIntakeMetadata, TextSource, TicketType, VoiceTranscript};
pub use enqueue::EnqueueOutcome;
pub use modality::SttProvider;
pub use priority_lane::compute_priority_lane;
pub use verify_duplicate::DuplicateConfig;
pub use verify_fraud::FraudFeatures;
pub use verify_weather::{WeatherCache, WeatherProvider};

use std::sync::Arc;

use aegis_domain_models::CoreError;
use aegis_infra_store::repositories::{DispatchJobRepository, IncidentRepository};
use libsql::Connection;
use tracing::instrument;

/// Categories the weather-verification stage applies to. Flood,
/// storm, and heat-related triage categories carry a weather
/// component worth confirming; everything else skips the call.
const WEATHER_TAGGED_CATEGORIES: &[&str] = &["Flood Rescue", "Storm Damage", "Heat Emergency", "Wildfire"];

pub fn category_is_weather_tagged(category: &str) -> bool {
    WEATHER_TAGGED_CATEGORIES.contains(&category)
}

/// Wires the five verification/lane/enqueue stages together against
/// one already-open transaction. Normalisation and modality analysis
/// run ahead of triage (the caller needs resolved text before it can
/// classify), so they're invoked directly via `normalise::normalise`
/// and `modality::analyse_modality` rather than through this struct.
#[derive(Clone)]
pub struct IngestionPipeline {
    incidents: IncidentRepository,
    dispatch_jobs: DispatchJobRepository,
    weather_cache: Arc<WeatherCache>,
    weather_provider: Option<Arc<dyn WeatherProvider>>,
    duplicate_config: Arc<DuplicateConfig>,
}

impl IngestionPipeline {
    pub fn new(weather_provider: Option<Arc<dyn WeatherProvider>>, duplicate_config: DuplicateConfig) -> Self {
        Self {
            incidents: IncidentRepository::new(),
            dispatch_jobs: DispatchJobRepository::new(),
            weather_cache: Arc::new(WeatherCache::new()),
            weather_provider,
            duplicate_config: Arc::new(duplicate_config),
        }
    }

    /// Runs verification (weather, duplicate density, fraud), maps
    /// the priority lane, and enqueues the dispatch job. `category`
    /// and `triage_priority` come from the triage result already
    /// computed by the caller for this submission.
    #[instrument(skip(self, connection, document))]
    pub async fn verify_and_enqueue(
        &self,
        connection: &Connection,
        document: &IntakeDocument,
        mut annotations: IntakeAnnotations,
        category: &str,
        triage_priority: u8,
        fraud_features: &FraudFeatures,
        incident_client_id: &str,
    ) -> Result<EnqueueOutcome, CoreError> {
        annotations.weather_unverified = verify_weather::verify_weather(
            self.weather_provider.as_deref(),
            &self.weather_cache,
            document.latitude,
            document.longitude,
            category_is_weather_tagged(category),
        )
        .await;

        let (likely_duplicate, duplicate_cluster_id) = verify_duplicate::verify_duplicate(
            &self.incidents,
            connection,
            document.latitude,
            document.longitude,
            &self.duplicate_config,
        )
        .await?;
        annotations.likely_duplicate = likely_duplicate;
        annotations.duplicate_cluster_id = duplicate_cluster_id;

        annotations.fraud_score = verify_fraud::score_fraud(fraud_features);
        annotations.requires_review = verify_fraud::requires_review(annotations.fraud_score);

        let lane = priority_lane::compute_priority_lane(triage_priority, annotations.requires_review, annotations.likely_duplicate);
        annotations.lane = Some(lane);

        enqueue::enqueue(&self.dispatch_jobs, connection, document, &annotations, lane, incident_client_id).await
    }
}
