// [libs/domain/models/src/dispatch_job.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchJobState {
    Queued,
    InFlight,
    Delivered,
    FailedTerminal,
}

impl DispatchJobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchJobState::Queued => "queued",
            DispatchJobState::InFlight => "in_flight",
            DispatchJobState::Delivered => "delivered",
            DispatchJobState::FailedTerminal => "failed_terminal",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "queued" => Some(Self::Queued),
            "in_flight" => Some(Self::InFlight),
            "delivered" => Some(Self::Delivered),
            "failed_terminal" => Some(Self::FailedTerminal),
            _ => None,
        }
    }
}

/// Priority lane computed by the mobile ingestion pipeline,
/// consumed by the Dispatch Worker's strict-lane-order drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLane {
    P0,
    P1,
    P2,
    P3,
}

impl PriorityLane {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLane::P0 => "p0",
            PriorityLane::P1 => "p1",
            PriorityLane::P2 => "p2",
            PriorityLane::P3 => "p3",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchJob {
    pub id: String,
    pub incident_client_id: String,
    pub idempotency_key: String,
    pub payload: Value,
    pub lane: PriorityLane,
    pub attempt_count: u32,
    pub next_attempt_at: DateTime<Utc>,
    pub state: DispatchJobState,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
