// [libs/domain/lifecycle/src/coordinator.rs]
/*!
 * =================================================================
 * APARATO: LIFECYCLE COORDINATOR (V1.0)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2/L3 BOUNDARY)
 * RESPONSABILIDAD: LA ÚNICA PUERTA DE ENTRADA A LAS TRANSICIONES
 * DE LA FSM DE INCIDENTES
 *
 * Cada método público abre una transacción Store (`BEGIN IMMEDIATE`),
 * valida autorización y estado, aplica el delta de carga mediante el
 * Workload Ledger, y cierra con `COMMIT` o `ROLLBACK`. Nada fuera de
 * este aparato escribe en `incidents`, `organisations`, `divisions`
 * o `staff`.
 * =================================================================
 */

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use aegis_core_geo::LatLng;
use aegis_domain_assignment::{CandidateRanker, FleetSnapshot, WeightedRanker};
use aegis_domain_models::{
    AuditEvent, CoreError, Incident, IncidentStatus, Principal,
};
use aegis_domain_triage::Classifier;
use aegis_infra_store::repositories::{
    AuditRepository, DivisionRepository, OrganisationRepository, StaffRepository,
};
use aegis_infra_store::{DbClient, IncidentRepository};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use libsql::Connection;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::fsm::{self, Transition};
use crate::ledger::{AssignmentTriplet, WorkloadLedger};
use crate::policy::{authorise, Action, IncidentAuthContext, PolicyDecision};

const SYSTEM_PRINCIPAL: &str = "SYSTEM_SWEEP";

#[derive(Debug, Clone)]
pub struct CreateIncidentInput {
    pub external_id: Option<String>,
    pub reporter_source: String,
    pub text: String,
    pub voice_transcript: Option<String>,
    pub place_label: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub headcount_affected: u32,
    pub created_by: String,
    pub category_hint: Option<String>,
}

pub struct LifecycleCoordinator<R: CandidateRanker = WeightedRanker> {
    db: DbClient,
    incidents: IncidentRepository,
    organisations: OrganisationRepository,
    divisions: DivisionRepository,
    staff: StaffRepository,
    audit: AuditRepository,
    ledger: WorkloadLedger,
    ranker: R,
    classifier: Option<Arc<dyn Classifier>>,
    assignment_window: ChronoDuration,
    reject_cooldown: ChronoDuration,
    /// `(incident_id, organisation_id) -> cooldown expiry`. In-process
    /// only: this models the coordinator as a single-process scheduler, so a
    /// restart dropping cooldowns (and simply re-ranking fresh) is an
    /// acceptable boundary, unlike the durable dispatch queue.
    cooldowns: Arc<Mutex<HashMap<(String, String), DateTime<Utc>>>>,
}

impl LifecycleCoordinator<WeightedRanker> {
    pub fn new(db: DbClient, classifier: Option<Arc<dyn Classifier>>, assignment_window_seconds: i64, reject_cooldown_seconds: i64) -> Self {
        Self::with_ranker(db, WeightedRanker, classifier, assignment_window_seconds, reject_cooldown_seconds)
    }
}

impl<R: CandidateRanker> LifecycleCoordinator<R> {
    pub fn with_ranker(
        db: DbClient,
        ranker: R,
        classifier: Option<Arc<dyn Classifier>>,
        assignment_window_seconds: i64,
        reject_cooldown_seconds: i64,
    ) -> Self {
        Self {
            db,
            incidents: IncidentRepository::new(),
            organisations: OrganisationRepository::new(),
            divisions: DivisionRepository::new(),
            staff: StaffRepository::new(),
            audit: AuditRepository::new(),
            ledger: WorkloadLedger::new(),
            ranker,
            classifier,
            assignment_window: ChronoDuration::seconds(assignment_window_seconds),
            reject_cooldown: ChronoDuration::seconds(reject_cooldown_seconds),
            cooldowns: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn begin(&self) -> Result<Connection, CoreError> {
        let connection = self.db.connection().map_err(CoreError::from)?;
        connection
            .execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|e| CoreError::Internal(format!("begin transaction: {e}")))?;
        Ok(connection)
    }

    async fn commit(&self, connection: &Connection) -> Result<(), CoreError> {
        connection
            .execute("COMMIT", ())
            .await
            .map_err(|e| CoreError::Internal(format!("commit transaction: {e}")))?;
        Ok(())
    }

    async fn rollback(&self, connection: &Connection) {
        if let Err(e) = connection.execute("ROLLBACK", ()).await {
            warn!("⚠️ [TX_ROLLBACK_FAULT]: rollback itself failed: {e}");
        }
    }

    #[instrument(skip(self, principal, input), fields(created_by = %input.created_by))]
    pub async fn create(&self, principal: &Principal, input: CreateIncidentInput) -> Result<Incident, CoreError> {
        enforce(authorise(principal, Action::Create, &IncidentAuthContext::default()))?;

        let connection = self.begin().await?;
        match self.create_tx(&connection, principal, input).await {
            Ok(incident) => {
                self.commit(&connection).await?;
                info!("🆘 [INCIDENT_CREATED]: {} ({})", incident.id, incident.category);
                Ok(incident)
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    async fn create_tx(&self, connection: &Connection, principal: &Principal, input: CreateIncidentInput) -> Result<Incident, CoreError> {
        let triage = aegis_domain_triage::triage(
            self.classifier.as_deref(),
            &input.text,
            input.headcount_affected,
            input.place_label.as_deref(),
            input.voice_transcript.as_deref(),
            input.category_hint.as_deref(),
        )
        .await;

        let now = Utc::now();
        let incident = Incident {
            id: Uuid::new_v4().to_string(),
            external_id: input.external_id,
            reporter_source: input.reporter_source,
            text: input.text,
            voice_transcript: input.voice_transcript,
            category: triage.category.clone(),
            priority: triage.priority,
            required_division_type: Some(triage.required_division_type.clone()),
            required_skills: triage.required_skills.iter().cloned().collect(),
            triage: Some(triage),
            place_label: input.place_label,
            latitude: input.latitude,
            longitude: input.longitude,
            headcount_affected: input.headcount_affected,
            status: IncidentStatus::Pending,
            assigned_org_id: None,
            assigned_division_id: None,
            assigned_staff_id: None,
            assignment_window_deadline: None,
            estimated_completion: None,
            actual_completion: None,
            created_by: input.created_by.clone(),
            notes: None,
            created_at: now,
            updated_at: now,
        };

        self.incidents.insert(connection, &incident).await?;
        self.append_audit(connection, principal.id.clone(), &incident.id, "create", None, Some(&incident)).await?;
        Ok(incident)
    }

    #[instrument(skip(self, principal))]
    pub async fn start_window(&self, principal: &Principal, incident_id: &str) -> Result<Incident, CoreError> {
        enforce(authorise(principal, Action::StartWindow, &IncidentAuthContext::default()))?;

        let connection = self.begin().await?;
        let excluded = self.active_cooldowns_for(incident_id);
        match self.start_window_tx(&connection, &principal.id, incident_id, &excluded, None).await {
            Ok(incident) => {
                self.commit(&connection).await?;
                Ok(incident)
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    /// Ranks and opens a fresh assignment window. When `release_triplet`
    /// is `Some`, the previous hold is released and the new one acquired
    /// atomically via `ledger.rebalance` (the reject/expiry path); when
    /// `None`, the new hold is acquired on its own (the first-ever window
    /// on a freshly created incident).
    async fn start_window_tx(
        &self,
        connection: &Connection,
        acting_principal_id: &str,
        incident_id: &str,
        excluded_org_ids: &HashSet<String>,
        release_triplet: Option<&AssignmentTriplet>,
    ) -> Result<Incident, CoreError> {
        let incident = self.load_incident(connection, incident_id).await?;
        fsm::validate(Transition::StartWindow, incident.status)?;

        let triage = incident
            .triage
            .clone()
            .ok_or_else(|| CoreError::Internal(format!("incident {incident_id} has no triage result")))?;

        let snapshot = self.load_snapshot(connection, excluded_org_ids).await?;
        let location = LatLng::new(incident.latitude, incident.longitude);
        let mut candidates = self.ranker.rank(&triage, location, &snapshot);

        // Rank's contract: the coordinator picks the head of the ranked
        // list. No triplet-completeness filter here — a candidate with no
        // division/staff match is still the correct pick if it scored highest.
        let chosen = if candidates.is_empty() {
            if let Some(old) = release_triplet {
                self.ledger.release(connection, old).await?;
            }
            return Err(CoreError::CapacityExceeded(format!("no eligible organisation for incident {incident_id}")));
        } else {
            candidates.remove(0)
        };

        let org_id = chosen.organisation_id;
        let division_id = chosen.division_id;
        let staff_id = chosen.staff_id;
        let deadline = Utc::now() + self.assignment_window;

        self.incidents
            .start_assignment_window(connection, incident_id, &org_id, division_id.as_deref(), staff_id.as_deref(), deadline)
            .await?;

        // Staff only flips to Busy on `accept` (`ledger.mark_staff_busy`), so the
        // hold acquired here never touches the staff leg even when one is chosen.
        let new_triplet = AssignmentTriplet { organisation_id: org_id.clone(), division_id: division_id.clone(), staff_id: None };
        match release_triplet {
            Some(old) => self.ledger.rebalance(connection, old, &new_triplet).await?,
            None => self.ledger.acquire(connection, &new_triplet).await?,
        }

        self.append_audit(
            connection,
            acting_principal_id.to_string(),
            incident_id,
            "start_window",
            None,
            Some(&serde_json::json!({ "organisation_id": org_id, "division_id": division_id, "staff_id": staff_id, "deadline": deadline })),
        )
        .await?;

        self.load_incident(connection, incident_id).await
    }

    #[instrument(skip(self, principal))]
    pub async fn accept(&self, principal: &Principal, incident_id: &str) -> Result<Incident, CoreError> {
        let connection = self.begin().await?;
        match self.accept_tx(&connection, principal, incident_id).await {
            Ok(incident) => {
                self.commit(&connection).await?;
                Ok(incident)
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    async fn accept_tx(&self, connection: &Connection, principal: &Principal, incident_id: &str) -> Result<Incident, CoreError> {
        let incident = self.load_incident(connection, incident_id).await?;

        enforce(authorise(
            principal,
            Action::Accept,
            &IncidentAuthContext { assigned_staff_id: incident.assigned_staff_id.clone() },
        ))?;

        if fsm::accept_is_noop(incident.status) && incident.assigned_staff_id.as_deref() == Some(principal.id.as_str()) {
            return Ok(incident);
        }

        fsm::validate(Transition::Accept, incident.status)?;

        self.incidents.accept(connection, incident_id).await?;

        let staff_id = incident
            .assigned_staff_id
            .clone()
            .ok_or_else(|| CoreError::Internal(format!("incident {incident_id} has no assigned staff at accept")))?;
        self.ledger.mark_staff_busy(connection, &staff_id).await?;

        self.append_audit(connection, principal.id.clone(), incident_id, "accept", None, None).await?;
        self.load_incident(connection, incident_id).await
    }

    #[instrument(skip(self, principal))]
    pub async fn reject(&self, principal: &Principal, incident_id: &str, reason: &str) -> Result<Incident, CoreError> {
        let connection = self.begin().await?;
        match self.reject_and_reassign_tx(&connection, &principal.id, incident_id, reason, true).await {
            Ok(incident) => {
                self.commit(&connection).await?;
                Ok(incident)
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    /// Driven by the deadline sweep (`sweep.rs`); no responder
    /// involved, reason is fixed to `"timeout"`.
    pub async fn deadline_expiry(&self, incident_id: &str) -> Result<Incident, CoreError> {
        let connection = self.begin().await?;
        match self.reject_and_reassign_tx(&connection, SYSTEM_PRINCIPAL, incident_id, "timeout", false).await {
            Ok(incident) => {
                self.commit(&connection).await?;
                Ok(incident)
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    async fn reject_and_reassign_tx(
        &self,
        connection: &Connection,
        acting_principal_id: &str,
        incident_id: &str,
        reason: &str,
        check_policy: bool,
    ) -> Result<Incident, CoreError> {
        let incident = self.load_incident(connection, incident_id).await?;

        if check_policy {
            let principal = Principal { id: acting_principal_id.to_string(), role: aegis_domain_models::Role::Responder };
            enforce(authorise(
                &principal,
                Action::Reject,
                &IncidentAuthContext { assigned_staff_id: incident.assigned_staff_id.clone() },
            ))?;
        }
        fsm::validate(Transition::Reject, incident.status)?;

        let rejected_org_id = incident
            .assigned_org_id
            .clone()
            .ok_or_else(|| CoreError::Internal(format!("incident {incident_id} has no assigned org at reject")))?;
        let old_triplet = AssignmentTriplet {
            organisation_id: rejected_org_id.clone(),
            division_id: incident.assigned_division_id.clone(),
            staff_id: incident.assigned_staff_id.clone(),
        };

        self.incidents.reject(connection, incident_id).await?;

        self.append_audit(
            connection,
            acting_principal_id.to_string(),
            incident_id,
            "reject",
            None,
            Some(&serde_json::json!({ "organisation_id": rejected_org_id, "reason": reason })),
        )
        .await?;

        let expiry = Utc::now() + self.reject_cooldown;
        self.cooldowns.lock().unwrap().insert((incident_id.to_string(), rejected_org_id), expiry);

        let excluded = self.active_cooldowns_for(incident_id);
        match self.start_window_tx(connection, acting_principal_id, incident_id, &excluded, Some(&old_triplet)).await {
            Ok(reassigned) => Ok(reassigned),
            Err(e) => {
                warn!("⚠️ [NO_REASSIGN_CANDIDATE]: incident {incident_id} stays Pending after reject: {e}");
                self.load_incident(connection, incident_id).await
            }
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn complete(&self, principal: &Principal, incident_id: &str) -> Result<Incident, CoreError> {
        let connection = self.begin().await?;
        match self.complete_tx(&connection, principal, incident_id).await {
            Ok(incident) => {
                self.commit(&connection).await?;
                Ok(incident)
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    async fn complete_tx(&self, connection: &Connection, principal: &Principal, incident_id: &str) -> Result<Incident, CoreError> {
        let incident = self.load_incident(connection, incident_id).await?;
        enforce(authorise(
            principal,
            Action::Complete,
            &IncidentAuthContext { assigned_staff_id: incident.assigned_staff_id.clone() },
        ))?;
        fsm::validate(Transition::Complete, incident.status)?;

        let triplet = AssignmentTriplet {
            organisation_id: incident
                .assigned_org_id
                .clone()
                .ok_or_else(|| CoreError::Internal(format!("incident {incident_id} has no assigned org at complete")))?,
            division_id: incident.assigned_division_id.clone(),
            staff_id: incident.assigned_staff_id.clone(),
        };

        self.incidents.complete(connection, incident_id, Utc::now()).await?;
        self.ledger.release(connection, &triplet).await?;
        self.append_audit(connection, principal.id.clone(), incident_id, "complete", None, None).await?;
        self.load_incident(connection, incident_id).await
    }

    #[instrument(skip(self, principal))]
    pub async fn cancel(&self, principal: &Principal, incident_id: &str) -> Result<Incident, CoreError> {
        enforce(authorise(principal, Action::Cancel, &IncidentAuthContext::default()))?;

        let connection = self.begin().await?;
        match self.cancel_tx(&connection, principal, incident_id).await {
            Ok(incident) => {
                self.commit(&connection).await?;
                Ok(incident)
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    async fn cancel_tx(&self, connection: &Connection, principal: &Principal, incident_id: &str) -> Result<Incident, CoreError> {
        let incident = self.load_incident(connection, incident_id).await?;
        fsm::validate(Transition::Cancel, incident.status)?;

        let had_assignment = incident.status != IncidentStatus::Pending;
        self.incidents.cancel(connection, incident_id).await?;

        if had_assignment {
            let triplet = AssignmentTriplet {
                organisation_id: incident.assigned_org_id.clone().unwrap_or_default(),
                division_id: incident.assigned_division_id.clone(),
                staff_id: incident.assigned_staff_id.clone(),
            };
            if !triplet.organisation_id.is_empty() {
                self.ledger.release(connection, &triplet).await?;
            }
        }

        self.append_audit(connection, principal.id.clone(), incident_id, "cancel", None, None).await?;
        self.load_incident(connection, incident_id).await
    }

    #[instrument(skip(self, principal, notes))]
    pub async fn update_notes(&self, principal: &Principal, incident_id: &str, notes: Option<&str>) -> Result<Incident, CoreError> {
        enforce(authorise(principal, Action::UpdateNotes, &IncidentAuthContext::default()))?;

        let connection = self.begin().await?;
        match self.update_notes_tx(&connection, principal, incident_id, notes).await {
            Ok(incident) => {
                self.commit(&connection).await?;
                Ok(incident)
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    async fn update_notes_tx(
        &self,
        connection: &Connection,
        principal: &Principal,
        incident_id: &str,
        notes: Option<&str>,
    ) -> Result<Incident, CoreError> {
        self.incidents.update_notes(connection, incident_id, notes).await?;
        self.append_audit(
            connection,
            principal.id.clone(),
            incident_id,
            "update_notes",
            None,
            Some(serde_json::json!({ "notes": notes })),
        )
        .await?;
        self.load_incident(connection, incident_id).await
    }

    /// Hard delete (`DELETE /sos/{id}`): distinct from `cancel`, which
    /// leaves the row in place as a terminal state. Releases any open
    /// ledger hold first so a deleted incident never leaves load stuck.
    #[instrument(skip(self, principal))]
    pub async fn delete(&self, principal: &Principal, incident_id: &str) -> Result<(), CoreError> {
        enforce(authorise(principal, Action::Delete, &IncidentAuthContext::default()))?;

        let connection = self.begin().await?;
        match self.delete_tx(&connection, principal, incident_id).await {
            Ok(()) => {
                self.commit(&connection).await?;
                Ok(())
            }
            Err(e) => {
                self.rollback(&connection).await;
                Err(e)
            }
        }
    }

    async fn delete_tx(&self, connection: &Connection, principal: &Principal, incident_id: &str) -> Result<(), CoreError> {
        let incident = self.load_incident(connection, incident_id).await?;

        let has_open_hold = incident.has_assignment_triplet()
            && !matches!(incident.status, IncidentStatus::Done | IncidentStatus::Cancelled);
        if has_open_hold {
            let triplet = AssignmentTriplet {
                organisation_id: incident.assigned_org_id.clone().unwrap_or_default(),
                division_id: incident.assigned_division_id.clone(),
                staff_id: incident.assigned_staff_id.clone(),
            };
            if !triplet.organisation_id.is_empty() {
                self.ledger.release(connection, &triplet).await?;
            }
        }

        self.incidents.delete(connection, incident_id).await?;
        self.append_audit(connection, principal.id.clone(), incident_id, "delete", Some(&incident), None).await?;
        Ok(())
    }

    async fn load_incident(&self, connection: &Connection, incident_id: &str) -> Result<Incident, CoreError> {
        self.incidents
            .find_by_id(connection, incident_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("incident {incident_id}")))
    }

    async fn load_snapshot(&self, connection: &Connection, excluded_org_ids: &HashSet<String>) -> Result<FleetSnapshot, CoreError> {
        let organisations = self
            .organisations
            .list_active(connection)
            .await?
            .into_iter()
            .filter(|o| !excluded_org_ids.contains(&o.id))
            .collect::<Vec<_>>();
        let divisions = self.divisions.list_all(connection).await?;
        let staff = self.staff.list_all(connection).await?;
        Ok(FleetSnapshot::new(organisations, divisions, staff))
    }

    fn active_cooldowns_for(&self, incident_id: &str) -> HashSet<String> {
        let now = Utc::now();
        let guard = self.cooldowns.lock().unwrap();
        guard
            .iter()
            .filter(|((iid, _), expiry)| iid == incident_id && **expiry > now)
            .map(|((_, org_id), _)| org_id.clone())
            .collect()
    }

    async fn append_audit(
        &self,
        connection: &Connection,
        principal_id: String,
        incident_id: &str,
        kind: &str,
        before: Option<&Incident>,
        after: Option<impl serde::Serialize>,
    ) -> Result<(), CoreError> {
        let event = AuditEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            principal: principal_id,
            incident_id: incident_id.to_string(),
            kind: kind.to_string(),
            before: before.map(|b| serde_json::to_value(b).unwrap_or(serde_json::Value::Null)),
            after: after.map(|a| serde_json::to_value(a).unwrap_or(serde_json::Value::Null)),
        };
        self.audit.append(connection, &event).await?;
        Ok(())
    }
}

fn enforce(decision: PolicyDecision) -> Result<(), CoreError> {
    match decision {
        PolicyDecision::Allow => Ok(()),
        PolicyDecision::Deny(reason) => Err(CoreError::Forbidden(reason)),
    }
}
