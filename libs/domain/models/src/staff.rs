// [libs/domain/models/src/staff.rs]
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Manager,
    Specialist,
    Worker,
    Volunteer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Busy,
    OffDuty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub organisation_id: String,
    pub division_id: Option<String>,
    pub role: StaffRole,
    pub skills: BTreeSet<String>,
    pub contact: Option<String>,
    pub availability: Availability,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: StaffStatus,
}

impl Staff {
    pub fn is_selectable(&self) -> bool {
        self.status == StaffStatus::Active && self.availability == Availability::Available
    }

    pub fn has_known_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}
