// [libs/domain/models/src/facility.rs]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    Shelter,
    Hospital,
}

/// Read-only from the core's perspective; used only by the
/// nearest-facility query (`/sos/{id}/nearest-facilities`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub facility_type: FacilityType,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: u32,
    pub current_occupancy: u32,
    pub beds_available: u32,
    pub icu_beds_available: Option<u32>,
}
