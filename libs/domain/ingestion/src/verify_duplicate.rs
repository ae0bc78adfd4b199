// [libs/domain/ingestion/src/verify_duplicate.rs]
//! Stage 3b: duplicate-density check. The Store pre-filters by
//! a coarse bounding box (no great-circle function in SQLite); this
//! narrows the candidates to the exact radius with
//! `aegis_core_geo::haversine_km` before counting.

use aegis_core_geo::{haversine_km, LatLng};
use aegis_domain_models::CoreError;
use aegis_infra_store::IncidentRepository;
use chrono::{Duration as ChronoDuration, Utc};
use libsql::Connection;
use tracing::instrument;

pub struct DuplicateConfig {
    pub radius_m: f64,
    pub window_seconds: i64,
    pub threshold: usize,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self { radius_m: 500.0, window_seconds: 1800, threshold: 3 }
    }
}

/// One degree of latitude is ~111km; longitude shrinks with
/// `cos(latitude)`. A generous box keeps the pre-filter a superset of
/// the true radius so the haversine pass never misses a candidate.
fn bounding_box(latitude: f64, longitude: f64, radius_m: f64) -> (f64, f64, f64, f64) {
    let lat_delta = (radius_m / 1000.0) / 111.0;
    let lng_delta = lat_delta / latitude.to_radians().cos().abs().max(0.01);
    (latitude - lat_delta, latitude + lat_delta, longitude - lng_delta, longitude + lng_delta)
}

/// Returns `(likely_duplicate, nearest_cluster_id)`. The cluster id is
/// the id of the closest matching incident within radius — a cheap
/// stand-in for an actual clustering pass.
#[instrument(skip(incidents, connection, config))]
pub async fn verify_duplicate(
    incidents: &IncidentRepository,
    connection: &Connection,
    latitude: f64,
    longitude: f64,
    config: &DuplicateConfig,
) -> Result<(bool, Option<String>), CoreError> {
    let since = Utc::now() - ChronoDuration::seconds(config.window_seconds);
    let (lat_min, lat_max, lng_min, lng_max) = bounding_box(latitude, longitude, config.radius_m);

    let candidates = incidents
        .list_recent_near_bbox(connection, lat_min, lat_max, lng_min, lng_max, since)
        .await
        .map_err(CoreError::from)?;

    let origin = LatLng::new(latitude, longitude);
    let mut within_radius: Vec<(String, f64)> = candidates
        .into_iter()
        .filter_map(|incident| {
            let distance_km = haversine_km(origin, LatLng::new(incident.latitude, incident.longitude));
            (distance_km * 1000.0 <= config.radius_m).then_some((incident.id, distance_km))
        })
        .collect();

    within_radius.sort_by(|a, b| a.1.total_cmp(&b.1));

    let likely_duplicate = within_radius.len() >= config.threshold;
    let nearest_cluster_id = within_radius.first().map(|(id, _)| id.clone());

    Ok((likely_duplicate, if likely_duplicate { nearest_cluster_id } else { None }))
}
