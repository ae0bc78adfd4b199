// [libs/infra/store/src/repositories/incidents.rs]
/*!
 * =================================================================
 * APARATO: INCIDENT REPOSITORY (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL TICKET Y SUS TRANSICIONES DE FSM
 *
 * Las transiciones de estado se implementan como `UPDATE ... WHERE
 * status = ?` condicionales (optimistic concurrency). Cero filas
 * afectadas significa conflicto, no fallo: el Lifecycle Coordinator
 * decide cómo reaccionar.
 * =================================================================
 */

use aegis_domain_models::{Incident, IncidentStatus, TriageResult};
use libsql::{params, Connection, Row};
use tracing::{instrument, warn};

use crate::errors::StoreError;
use crate::time::{format_timestamp, parse_timestamp, parse_timestamp_opt};

const SELECT_COLUMNS: &str = "
    id, external_id, reporter_source, text, voice_transcript,
    category, priority, required_division_type, required_skills_json, triage_json,
    place_label, latitude, longitude, headcount_affected,
    status, assigned_org_id, assigned_division_id, assigned_staff_id, assignment_window_deadline,
    estimated_completion, actual_completion, created_by, notes, created_at, updated_at
";

#[derive(Clone, Default)]
pub struct IncidentRepository;

impl IncidentRepository {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, connection, incident), fields(incident_id = %incident.id))]
    pub async fn insert(&self, connection: &Connection, incident: &Incident) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO incidents ({SELECT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24,?25)"
        );

        connection
            .execute(
                &sql,
                params![
                    incident.id.clone(),
                    incident.external_id.clone(),
                    incident.reporter_source.clone(),
                    incident.text.clone(),
                    incident.voice_transcript.clone(),
                    incident.category.clone(),
                    incident.priority as i64,
                    incident.required_division_type.clone(),
                    serde_json::to_string(&incident.required_skills)
                        .map_err(|e| StoreError::Mapping(e.to_string()))?,
                    incident
                        .triage
                        .as_ref()
                        .map(serde_json::to_string)
                        .transpose()
                        .map_err(|e| StoreError::Mapping(e.to_string()))?,
                    incident.place_label.clone(),
                    incident.latitude,
                    incident.longitude,
                    incident.headcount_affected as i64,
                    incident.status.as_str(),
                    incident.assigned_org_id.clone(),
                    incident.assigned_division_id.clone(),
                    incident.assigned_staff_id.clone(),
                    incident.assignment_window_deadline.map(format_timestamp),
                    incident.estimated_completion.map(format_timestamp),
                    incident.actual_completion.map(format_timestamp),
                    incident.created_by.clone(),
                    incident.notes.clone(),
                    format_timestamp(incident.created_at),
                    format_timestamp(incident.updated_at),
                ],
            )
            .await
            .map_err(StoreError::Query)?;

        Ok(())
    }

    pub async fn find_by_id(&self, connection: &Connection, id: &str) -> Result<Option<Incident>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM incidents WHERE id = ?1");
        let mut rows = connection.query(&sql, params![id.to_string()]).await.map_err(StoreError::Query)?;
        match rows.next().await.map_err(StoreError::Query)? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_status(
        &self,
        connection: &Connection,
        status: IncidentStatus,
        limit: i64,
    ) -> Result<Vec<Incident>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM incidents WHERE status = ?1 ORDER BY priority DESC, created_at ASC LIMIT ?2"
        );
        let mut rows = connection
            .query(&sql, params![status.as_str(), limit])
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    /// Count of non-terminal incidents currently assigned to a given
    /// staff member. The Workload Ledger uses this to decide whether
    /// a release is that staffer's *last* active assignment before
    /// flipping them back to `Available`.
    pub async fn count_active_for_staff(&self, connection: &Connection, staff_id: &str) -> Result<i64, StoreError> {
        let mut rows = connection
            .query(
                "SELECT COUNT(*) FROM incidents WHERE assigned_staff_id = ?1 AND status IN ('pending_assignment', 'in_progress')",
                params![staff_id.to_string()],
            )
            .await
            .map_err(StoreError::Query)?;

        let row = rows.next().await.map_err(StoreError::Query)?.expect("COUNT(*) always returns one row");
        row.get(0).map_err(StoreError::Query)
    }

    /// Reconciliation helper: the load an organisation or
    /// division *should* have right now, counted directly from
    /// incident rows rather than trusted from the denormalised column.
    pub async fn count_active_for_organisation(&self, connection: &Connection, org_id: &str) -> Result<i64, StoreError> {
        let mut rows = connection
            .query(
                "SELECT COUNT(*) FROM incidents WHERE assigned_org_id = ?1 AND status IN ('pending_assignment', 'in_progress')",
                params![org_id.to_string()],
            )
            .await
            .map_err(StoreError::Query)?;

        let row = rows.next().await.map_err(StoreError::Query)?.expect("COUNT(*) always returns one row");
        row.get(0).map_err(StoreError::Query)
    }

    pub async fn count_active_for_division(&self, connection: &Connection, division_id: &str) -> Result<i64, StoreError> {
        let mut rows = connection
            .query(
                "SELECT COUNT(*) FROM incidents WHERE assigned_division_id = ?1 AND status IN ('pending_assignment', 'in_progress')",
                params![division_id.to_string()],
            )
            .await
            .map_err(StoreError::Query)?;

        let row = rows.next().await.map_err(StoreError::Query)?.expect("COUNT(*) always returns one row");
        row.get(0).map_err(StoreError::Query)
    }

    /// Candidate rows for duplicate-density scoring: incidents
    /// created since `since` inside a coarse bounding box around
    /// `(lat, lng)`. The caller narrows this down to the configured
    /// radius with an exact haversine check — SQLite has no
    /// great-circle function, so the box is a pre-filter, not the
    /// final answer.
    pub async fn list_recent_near_bbox(
        &self,
        connection: &Connection,
        lat_min: f64,
        lat_max: f64,
        lng_min: f64,
        lng_max: f64,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Incident>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM incidents WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4 AND created_at >= ?5"
        );
        let mut rows = connection
            .query(&sql, params![lat_min, lat_max, lng_min, lng_max, format_timestamp(since)])
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    /// Expired assignment windows: `PendingAssignment` rows whose
    /// deadline has already passed. Feeds the deadline-expiry sweep.
    pub async fn list_expired_assignment_windows(
        &self,
        connection: &Connection,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Incident>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM incidents WHERE status = 'pending_assignment' AND assignment_window_deadline IS NOT NULL AND assignment_window_deadline < ?1"
        );
        let mut rows = connection
            .query(&sql, params![format_timestamp(now)])
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    /// Full listing for `GET /sos`, newest first, independent of status.
    pub async fn list_all(&self, connection: &Connection, limit: i64, offset: i64) -> Result<Vec<Incident>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM incidents ORDER BY created_at DESC LIMIT ?1 OFFSET ?2");
        let mut rows = connection.query(&sql, params![limit, offset]).await.map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    /// `PUT /sos/{id}` is bounded to the notes field; FSM transitions
    /// are the only way `status` itself moves.
    #[instrument(skip(self, connection, notes))]
    pub async fn update_notes(&self, connection: &Connection, id: &str, notes: Option<&str>) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE incidents SET notes = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), notes.map(str::to_string), format_timestamp(chrono::Utc::now())],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("incident {id} not found")));
        }
        Ok(())
    }

    #[instrument(skip(self, connection))]
    pub async fn delete(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        let affected = connection
            .execute("DELETE FROM incidents WHERE id = ?1", params![id.to_string()])
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("incident {id} not found")));
        }
        Ok(())
    }

    #[instrument(skip(self, connection, triage))]
    pub async fn attach_triage(
        &self,
        connection: &Connection,
        id: &str,
        triage: &TriageResult,
    ) -> Result<(), StoreError> {
        let triage_json = serde_json::to_string(triage).map_err(|e| StoreError::Mapping(e.to_string()))?;
        let affected = connection
            .execute(
                "UPDATE incidents SET category = ?2, priority = ?3, required_division_type = ?4, triage_json = ?5, updated_at = ?6 WHERE id = ?1",
                params![
                    id.to_string(),
                    triage.category.clone(),
                    triage.priority as i64,
                    triage.required_division_type.clone(),
                    triage_json,
                    format_timestamp(chrono::Utc::now()),
                ],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("incident {id} not found")));
        }
        Ok(())
    }

    /// Opens the assignment window: `Pending -> PendingAssignment` with
    /// the candidate triplet and a deadline. The triplet's division/staff
    /// legs are nullable, mirroring `AssignmentTriplet` — the head of the
    /// ranked list may carry only an organisation match. Conflicts
    /// (already moved, or concurrently cancelled) surface as
    /// `StoreError::Conflict`.
    #[instrument(skip(self, connection))]
    pub async fn start_assignment_window(
        &self,
        connection: &Connection,
        id: &str,
        org_id: &str,
        division_id: Option<&str>,
        staff_id: Option<&str>,
        deadline: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE incidents SET status = 'pending_assignment', assigned_org_id = ?2, assigned_division_id = ?3, assigned_staff_id = ?4, assignment_window_deadline = ?5, updated_at = ?6 WHERE id = ?1 AND status = 'pending'",
                params![
                    id.to_string(),
                    org_id.to_string(),
                    division_id.map(str::to_string),
                    staff_id.map(str::to_string),
                    format_timestamp(deadline),
                    format_timestamp(chrono::Utc::now()),
                ],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            warn!("⚠️ [CONFLICT]: incident {} was not pending when assignment window opened", id);
            return Err(StoreError::Conflict(format!("incident {id} is not in pending state")));
        }
        Ok(())
    }

    #[instrument(skip(self, connection))]
    pub async fn accept(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        self.transition(connection, id, IncidentStatus::PendingAssignment, IncidentStatus::InProgress).await
    }

    /// Rejection returns the incident to `Pending` and clears the
    /// candidate triplet; re-ranking happens on the next dispatch pass.
    #[instrument(skip(self, connection))]
    pub async fn reject(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE incidents SET status = 'pending', assigned_org_id = NULL, assigned_division_id = NULL, assigned_staff_id = NULL, assignment_window_deadline = NULL, updated_at = ?2 WHERE id = ?1 AND status = 'pending_assignment'",
                params![id.to_string(), format_timestamp(chrono::Utc::now())],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::Conflict(format!("incident {id} is not awaiting acceptance")));
        }
        Ok(())
    }

    /// Deadline expiry behaves like a reject triggered by the sweep
    /// instead of a responder.
    #[instrument(skip(self, connection))]
    pub async fn expire_assignment_window(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        self.reject(connection, id).await
    }

    #[instrument(skip(self, connection))]
    pub async fn complete(
        &self,
        connection: &Connection,
        id: &str,
        actual_completion: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE incidents SET status = 'done', actual_completion = ?2, updated_at = ?3 WHERE id = ?1 AND status = 'in_progress'",
                params![id.to_string(), format_timestamp(actual_completion), format_timestamp(chrono::Utc::now())],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::Conflict(format!("incident {id} is not in progress")));
        }
        Ok(())
    }

    #[instrument(skip(self, connection))]
    pub async fn cancel(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE incidents SET status = 'cancelled', updated_at = ?2 WHERE id = ?1 AND status NOT IN ('done', 'cancelled')",
                params![id.to_string(), format_timestamp(chrono::Utc::now())],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::Conflict(format!("incident {id} is already terminal")));
        }
        Ok(())
    }

    async fn transition(
        &self,
        connection: &Connection,
        id: &str,
        expected: IncidentStatus,
        next: IncidentStatus,
    ) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE incidents SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
                params![id.to_string(), expected.as_str(), next.as_str(), format_timestamp(chrono::Utc::now())],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::Conflict(format!(
                "incident {id} is not in state {}",
                expected.as_str()
            )));
        }
        Ok(())
    }
}

fn map_row(row: &Row) -> Result<Incident, StoreError> {
    let required_skills_json: String = row.get(8).map_err(StoreError::Query)?;
    let required_skills = serde_json::from_str(&required_skills_json).map_err(|e| StoreError::Mapping(e.to_string()))?;

    let triage_json: Option<String> = row.get(9).map_err(StoreError::Query)?;
    let triage = triage_json
        .map(|raw| serde_json::from_str::<TriageResult>(&raw))
        .transpose()
        .map_err(|e| StoreError::Mapping(e.to_string()))?;

    let status_raw: String = row.get(14).map_err(StoreError::Query)?;
    let status = IncidentStatus::parse(&status_raw)
        .ok_or_else(|| StoreError::Mapping(format!("unknown incident status '{status_raw}'")))?;

    let created_at_raw: String = row.get(23).map_err(StoreError::Query)?;
    let updated_at_raw: String = row.get(24).map_err(StoreError::Query)?;

    Ok(Incident {
        id: row.get(0).map_err(StoreError::Query)?,
        external_id: row.get(1).map_err(StoreError::Query)?,
        reporter_source: row.get(2).map_err(StoreError::Query)?,
        text: row.get(3).map_err(StoreError::Query)?,
        voice_transcript: row.get(4).map_err(StoreError::Query)?,
        category: row.get(5).map_err(StoreError::Query)?,
        priority: row.get::<i64>(6).map_err(StoreError::Query)? as u8,
        required_division_type: row.get(7).map_err(StoreError::Query)?,
        required_skills,
        triage,
        place_label: row.get(10).map_err(StoreError::Query)?,
        latitude: row.get(11).map_err(StoreError::Query)?,
        longitude: row.get(12).map_err(StoreError::Query)?,
        headcount_affected: row.get::<i64>(13).map_err(StoreError::Query)? as u32,
        status,
        assigned_org_id: row.get(15).map_err(StoreError::Query)?,
        assigned_division_id: row.get(16).map_err(StoreError::Query)?,
        assigned_staff_id: row.get(17).map_err(StoreError::Query)?,
        assignment_window_deadline: parse_timestamp_opt(row.get(18).map_err(StoreError::Query)?)?,
        estimated_completion: parse_timestamp_opt(row.get(19).map_err(StoreError::Query)?)?,
        actual_completion: parse_timestamp_opt(row.get(20).map_err(StoreError::Query)?)?,
        created_by: row.get(21).map_err(StoreError::Query)?,
        notes: row.get(22).map_err(StoreError::Query)?,
        created_at: parse_timestamp(&created_at_raw)?,
        updated_at: parse_timestamp(&updated_at_raw)?,
    })
}
