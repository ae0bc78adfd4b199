// [libs/domain/models/src/division.rs]
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionType {
    Medical,
    Rescue,
    Logistics,
    Communication,
    EmergencyResponse,
}

impl DivisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DivisionType::Medical => "Medical",
            DivisionType::Rescue => "Rescue",
            DivisionType::Logistics => "Logistics",
            DivisionType::Communication => "Communication",
            DivisionType::EmergencyResponse => "Emergency Response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    pub id: String,
    pub organisation_id: String,
    pub division_type: DivisionType,
    pub description: Option<String>,
    pub capacity: u32,
    pub current_load: u32,
    pub status: DivisionStatus,
    pub skills: BTreeSet<String>,
}

impl Division {
    pub fn headroom_fraction(&self) -> f64 {
        1.0 - (self.current_load as f64 / (self.capacity.max(1) as f64))
    }
}
