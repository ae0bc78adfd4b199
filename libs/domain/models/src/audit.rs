// [libs/domain/models/src/audit.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Append-only record. Never mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub principal: String,
    pub incident_id: String,
    pub kind: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}
