// [libs/domain/models/src/incident.rs]
/*!
 * =================================================================
 * APARATO: INCIDENT AGGREGATE (V1.0)
 * RESPONSABILIDAD: EL TICKET. Creado por el Lifecycle Coordinator,
 * mutado únicamente a través de sus transiciones.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::triage::TriageResult;

/// The incident FSM. `Pending` and `PendingAssignment` are distinct
/// persisted states — never collapsed into "has assignment fields or
/// not".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Pending,
    PendingAssignment,
    InProgress,
    Done,
    Cancelled,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::PendingAssignment => "pending_assignment",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Done => "done",
            IncidentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(IncidentStatus::Pending),
            "pending_assignment" => Some(IncidentStatus::PendingAssignment),
            "in_progress" => Some(IncidentStatus::InProgress),
            "done" => Some(IncidentStatus::Done),
            "cancelled" => Some(IncidentStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub external_id: Option<String>,
    pub reporter_source: String,
    pub text: String,
    pub voice_transcript: Option<String>,

    pub category: String,
    pub priority: u8,
    pub required_division_type: Option<String>,
    pub required_skills: Vec<String>,
    pub triage: Option<TriageResult>,

    pub place_label: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub headcount_affected: u32,

    pub status: IncidentStatus,

    pub assigned_org_id: Option<String>,
    pub assigned_division_id: Option<String>,
    pub assigned_staff_id: Option<String>,
    pub assignment_window_deadline: Option<DateTime<Utc>>,

    pub estimated_completion: Option<DateTime<Utc>>,
    pub actual_completion: Option<DateTime<Utc>>,

    pub created_by: String,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Headcount of zero is accepted on input but treated as 1 for
    /// scoring purposes.
    pub fn effective_headcount(&self) -> u32 {
        self.headcount_affected.max(1)
    }

    pub fn has_assignment_triplet(&self) -> bool {
        self.assigned_org_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_string() {
        for s in [
            IncidentStatus::Pending,
            IncidentStatus::PendingAssignment,
            IncidentStatus::InProgress,
            IncidentStatus::Done,
            IncidentStatus::Cancelled,
        ] {
            assert_eq!(IncidentStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn zero_headcount_treated_as_one() {
        let incident = sample_incident(0);
        assert_eq!(incident.effective_headcount(), 1);
    }

    #[test]
    fn nonzero_headcount_passes_through() {
        let incident = sample_incident(12);
        assert_eq!(incident.effective_headcount(), 12);
    }

    fn sample_incident(headcount: u32) -> Incident {
        let now = Utc::now();
        Incident {
            id: "inc-1".into(),
            external_id: None,
            reporter_source: "mobile".into(),
            text: "flood".into(),
            voice_transcript: None,
            category: "Flood Rescue".into(),
            priority: 5,
            required_division_type: Some("Rescue".into()),
            required_skills: vec![],
            triage: None,
            place_label: None,
            latitude: 0.0,
            longitude: 0.0,
            headcount_affected: headcount,
            status: IncidentStatus::Pending,
            assigned_org_id: None,
            assigned_division_id: None,
            assigned_staff_id: None,
            assignment_window_deadline: None,
            estimated_completion: None,
            actual_completion: None,
            created_by: "tester".into(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
