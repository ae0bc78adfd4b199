// [libs/domain/models/src/organisation.rs]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgType {
    Government,
    Ngo,
    VolunteerGroup,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgCategory {
    EmergencyResponse,
    Medical,
    Relief,
    Logistics,
    Rescue,
}

impl OrgCategory {
    /// The canonical string the Assignment Engine compares against
    /// `aegis_domain_triage::rules::org_category_for` (`category_match`).
    pub fn as_canonical_str(&self) -> &'static str {
        match self {
            OrgCategory::EmergencyResponse => "emergency_response",
            OrgCategory::Medical => "medical",
            OrgCategory::Relief => "relief",
            OrgCategory::Logistics => "logistics",
            OrgCategory::Rescue => "rescue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgStatus {
    Active,
    Available,
    Overloaded,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organisation {
    pub id: String,
    pub name: String,
    pub org_type: OrgType,
    pub category: OrgCategory,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: u32,
    pub current_load: u32,
    pub status: OrgStatus,
}

impl Organisation {
    /// Invariant: `status=Overloaded <=> current_load >= capacity`.
    /// Exposed so the Store and the reconciliation job can both assert it
    /// after a mutation rather than duplicating the comparison.
    pub fn recompute_status(&mut self) {
        if self.status == OrgStatus::Inactive {
            return;
        }
        self.status = if self.current_load >= self.capacity {
            OrgStatus::Overloaded
        } else if self.current_load == 0 {
            OrgStatus::Available
        } else {
            OrgStatus::Active
        };
    }

    pub fn headroom_fraction(&self) -> f64 {
        1.0 - (self.current_load as f64 / (self.capacity.max(1) as f64))
    }

    pub fn is_at_or_over_capacity(&self) -> bool {
        self.current_load >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(capacity: u32, load: u32) -> Organisation {
        Organisation {
            id: "org-1".into(),
            name: "Test Org".into(),
            org_type: OrgType::Ngo,
            category: OrgCategory::Rescue,
            region: None,
            latitude: 0.0,
            longitude: 0.0,
            capacity,
            current_load: load,
            status: OrgStatus::Active,
        }
    }

    #[test]
    fn overloaded_status_matches_invariant() {
        let mut o = org(5, 5);
        o.recompute_status();
        assert_eq!(o.status, OrgStatus::Overloaded);
        assert!(o.is_at_or_over_capacity());
    }

    #[test]
    fn inactive_status_is_sticky() {
        let mut o = org(5, 0);
        o.status = OrgStatus::Inactive;
        o.recompute_status();
        assert_eq!(o.status, OrgStatus::Inactive);
    }
}
