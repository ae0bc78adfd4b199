// [libs/infra/store/src/schema.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: IDEMPOTENT TABLE DEFINITIONS
 * =================================================================
 */

use libsql::Connection;
use tracing::{debug, instrument};

use crate::errors::StoreError;

const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_INCIDENTS", r#"
        CREATE TABLE IF NOT EXISTS incidents (
            id TEXT PRIMARY KEY,
            external_id TEXT,
            reporter_source TEXT NOT NULL,
            text TEXT NOT NULL,
            voice_transcript TEXT,
            category TEXT NOT NULL,
            priority INTEGER NOT NULL,
            required_division_type TEXT,
            required_skills_json TEXT NOT NULL DEFAULT '[]',
            triage_json TEXT,
            place_label TEXT,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            headcount_affected INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending',
            assigned_org_id TEXT,
            assigned_division_id TEXT,
            assigned_staff_id TEXT,
            assignment_window_deadline TEXT,
            estimated_completion TEXT,
            actual_completion TEXT,
            created_by TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
    "#),
    ("TABLE_ORGANISATIONS", r#"
        CREATE TABLE IF NOT EXISTS organisations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            org_type TEXT NOT NULL,
            category TEXT NOT NULL,
            region TEXT,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            capacity INTEGER NOT NULL DEFAULT 0,
            current_load INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active'
        );
    "#),
    ("TABLE_DIVISIONS", r#"
        CREATE TABLE IF NOT EXISTS divisions (
            id TEXT PRIMARY KEY,
            organisation_id TEXT NOT NULL,
            division_type TEXT NOT NULL,
            description TEXT,
            capacity INTEGER NOT NULL DEFAULT 0,
            current_load INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active',
            skills_json TEXT NOT NULL DEFAULT '[]'
        );
    "#),
    ("TABLE_STAFF", r#"
        CREATE TABLE IF NOT EXISTS staff (
            id TEXT PRIMARY KEY,
            organisation_id TEXT NOT NULL,
            division_id TEXT,
            role TEXT NOT NULL,
            skills_json TEXT NOT NULL DEFAULT '[]',
            contact TEXT,
            availability TEXT NOT NULL DEFAULT 'available',
            latitude REAL,
            longitude REAL,
            status TEXT NOT NULL DEFAULT 'active'
        );
    "#),
    ("TABLE_FACILITIES", r#"
        CREATE TABLE IF NOT EXISTS facilities (
            id TEXT PRIMARY KEY,
            facility_type TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            capacity INTEGER NOT NULL DEFAULT 0,
            current_occupancy INTEGER NOT NULL DEFAULT 0,
            beds_available INTEGER NOT NULL DEFAULT 0,
            icu_beds_available INTEGER
        );
    "#),
    ("TABLE_DISPATCH_JOBS", r#"
        CREATE TABLE IF NOT EXISTS dispatch_jobs (
            id TEXT PRIMARY KEY,
            incident_client_id TEXT NOT NULL,
            idempotency_key TEXT NOT NULL UNIQUE,
            payload_json TEXT NOT NULL,
            lane TEXT NOT NULL,
            attempt_count INTEGER NOT NULL DEFAULT 0,
            next_attempt_at TEXT NOT NULL DEFAULT (datetime('now')),
            state TEXT NOT NULL DEFAULT 'queued',
            last_error TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
    "#),
    ("TABLE_AUDIT_LOG", r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id TEXT PRIMARY KEY,
            timestamp TEXT NOT NULL DEFAULT (datetime('now')),
            principal TEXT NOT NULL,
            incident_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            before_json TEXT,
            after_json TEXT
        );
    "#),
    ("INDEX_INCIDENTS_STATUS", r#"
        CREATE INDEX IF NOT EXISTS idx_incidents_status ON incidents(status);
    "#),
    ("INDEX_INCIDENTS_LOCATION_TIME", r#"
        CREATE INDEX IF NOT EXISTS idx_incidents_location_time ON incidents(latitude, longitude, created_at);
    "#),
    ("INDEX_DISPATCH_LANE_STATE", r#"
        CREATE INDEX IF NOT EXISTS idx_dispatch_lane_state ON dispatch_jobs(state, lane, next_attempt_at);
    "#),
];

#[instrument(skip(connection))]
pub async fn apply_full_schema(connection: &Connection) -> Result<(), StoreError> {
    for (label, statement) in TACTICAL_TABLES {
        connection.execute(statement, ()).await.map_err(StoreError::Query)?;
        debug!("🧱 [SCHEMA]: applied {}", label);
    }
    Ok(())
}
