// [libs/core/geo/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GEO PRIMITIVES (V1.0)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: DISTANCIA DE GRAN CÍRCULO Y APTITUD POR DISTANCIA
 * =================================================================
 */

/// Mean earth radius in kilometres, WGS-84 authalic approximation.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS-84 decimal-degree coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_half_lat = (delta_lat / 2.0).sin();
    let sin_half_lng = (delta_lng / 2.0).sin();

    let h = sin_half_lat * sin_half_lat + lat1.cos() * lat2.cos() * sin_half_lng * sin_half_lng;
    let c = 2.0 * h.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Linear distance-fit score over `[0, max_score]`: full score at
/// zero distance, decaying to zero at `reference_km` and beyond.
///
/// Organisations score against a `reference_km=100`; staff scoring
/// uses the same shape with a smaller reference radius, so the
/// reference distance is a parameter here.
pub fn distance_fit(distance_km: f64, reference_km: f64, max_score: f64) -> f64 {
    if reference_km <= 0.0 {
        return 0.0;
    }
    let fraction = 1.0 - (distance_km / reference_km);
    max_score * fraction.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_is_zero() {
        let p = LatLng::new(17.9689, 79.5941);
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn known_distance_warangal_hyderabad() {
        // Warangal Urban to Hyderabad, roughly 130km apart.
        let warangal = LatLng::new(17.9689, 79.5941);
        let hyderabad = LatLng::new(17.3850, 78.4867);
        let d = haversine_km(warangal, hyderabad);
        assert!((110.0..160.0).contains(&d), "unexpected distance: {d}");
    }

    #[test]
    fn distance_fit_full_score_at_zero() {
        assert_eq!(distance_fit(0.0, 100.0, 30.0), 30.0);
    }

    #[test]
    fn distance_fit_floors_at_zero_beyond_reference() {
        assert_eq!(distance_fit(250.0, 100.0, 30.0), 0.0);
    }

    #[test]
    fn distance_fit_half_reference_is_half_score() {
        let score = distance_fit(50.0, 100.0, 30.0);
        assert!((score - 15.0).abs() < 1e-9);
    }
}
