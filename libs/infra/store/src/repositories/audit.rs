// [libs/infra/store/src/repositories/audit.rs]
//! Append-only audit log. No update or delete method exists on this
//! repository by design — a correction is a new event, not an edit.

use aegis_domain_models::AuditEvent;
use libsql::{params, Connection, Row};
use serde_json::Value;

use crate::errors::StoreError;
use crate::time::{format_timestamp, parse_timestamp};

const SELECT_COLUMNS: &str = "id, timestamp, principal, incident_id, kind, before_json, after_json";

#[derive(Clone, Default)]
pub struct AuditRepository;

impl AuditRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn append(&self, connection: &Connection, event: &AuditEvent) -> Result<(), StoreError> {
        connection
            .execute(
                &format!("INSERT INTO audit_log ({SELECT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7)"),
                params![
                    event.id.clone(),
                    format_timestamp(event.timestamp),
                    event.principal.clone(),
                    event.incident_id.clone(),
                    event.kind.clone(),
                    event.before.as_ref().map(|v| v.to_string()),
                    event.after.as_ref().map(|v| v.to_string()),
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    pub async fn list_for_incident(&self, connection: &Connection, incident_id: &str) -> Result<Vec<AuditEvent>, StoreError> {
        let mut rows = connection
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM audit_log WHERE incident_id = ?1 ORDER BY timestamp ASC"),
                params![incident_id.to_string()],
            )
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }
}

fn map_row(row: &Row) -> Result<AuditEvent, StoreError> {
    let timestamp_raw: String = row.get(1).map_err(StoreError::Query)?;
    let before_json: Option<String> = row.get(5).map_err(StoreError::Query)?;
    let after_json: Option<String> = row.get(6).map_err(StoreError::Query)?;

    let before: Option<Value> = before_json
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| StoreError::Mapping(e.to_string()))?;
    let after: Option<Value> = after_json
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| StoreError::Mapping(e.to_string()))?;

    Ok(AuditEvent {
        id: row.get(0).map_err(StoreError::Query)?,
        timestamp: parse_timestamp(&timestamp_raw)?,
        principal: row.get(2).map_err(StoreError::Query)?,
        incident_id: row.get(3).map_err(StoreError::Query)?,
        kind: row.get(4).map_err(StoreError::Query)?,
        before,
        after,
    })
}
