// [libs/domain/lifecycle/src/ledger.rs]
/*!
 * =================================================================
 * APARATO: WORKLOAD LEDGER (write half) (V1.0)
 * RESPONSABILIDAD: MOVER current_load Y availability EN LOCKSTEP
 * CON LAS TRANSICIONES DE INCIDENTE
 *
 * Cada método asume que ya corre dentro de la transacción abierta
 * por el Lifecycle Coordinator; nunca abre ni cierra una transacción
 * por sí mismo.
 * =================================================================
 */

use aegis_domain_models::{Availability, CoreError, DivisionStatus, OrgStatus, StaffStatus};
use aegis_infra_store::repositories::{DivisionRepository, OrganisationRepository, StaffRepository};
use aegis_infra_store::IncidentRepository;
use libsql::Connection;

#[derive(Debug, Clone, Default)]
pub struct AssignmentTriplet {
    pub organisation_id: String,
    pub division_id: Option<String>,
    pub staff_id: Option<String>,
}

#[derive(Clone, Default)]
pub struct WorkloadLedger {
    organisations: OrganisationRepository,
    divisions: DivisionRepository,
    staff: StaffRepository,
    incidents: IncidentRepository,
}

impl WorkloadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// `org.current_load += 1`; `division.current_load += 1` if
    /// present; `staff.availability := Busy` if present. Refuses with
    /// `CapacityExceeded` if any target is Inactive; a staffer that
    /// raced away from `Available` surfaces as `StaleSnapshot` so the
    /// caller re-ranks rather than silently stealing the lock.
    pub async fn acquire(&self, connection: &Connection, triplet: &AssignmentTriplet) -> Result<(), CoreError> {
        let org = self
            .organisations
            .find_by_id(connection, &triplet.organisation_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("organisation {}", triplet.organisation_id)))?;
        if org.status == OrgStatus::Inactive {
            return Err(CoreError::CapacityExceeded(format!("organisation {} is inactive", triplet.organisation_id)));
        }

        if let Some(division_id) = &triplet.division_id {
            let division = self
                .divisions
                .find_by_id(connection, division_id)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("division {division_id}")))?;
            if division.status == DivisionStatus::Inactive {
                return Err(CoreError::CapacityExceeded(format!("division {division_id} is inactive")));
            }
        }

        if let Some(staff_id) = &triplet.staff_id {
            let staffer = self
                .staff
                .find_by_id(connection, staff_id)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("staff {staff_id}")))?;
            if staffer.status == StaffStatus::Inactive {
                return Err(CoreError::CapacityExceeded(format!("staff {staff_id} is inactive")));
            }
        }

        self.organisations.adjust_load(connection, &triplet.organisation_id, 1).await?;
        if let Some(division_id) = &triplet.division_id {
            self.divisions.adjust_load(connection, division_id, 1).await?;
        }
        if let Some(staff_id) = &triplet.staff_id {
            self.staff
                .set_availability(connection, staff_id, Availability::Available, Availability::Busy)
                .await
                .map_err(|_| CoreError::StaleSnapshot(format!("staff {staff_id} is no longer available")))?;
        }

        Ok(())
    }

    /// Symmetric decrement. Staff only flips back to `Available` if
    /// the incident being released was their last active assignment
    /// — callers MUST update the incident's own status before
    /// calling this, so `count_active_for_staff` doesn't count the
    /// row being released.
    pub async fn release(&self, connection: &Connection, triplet: &AssignmentTriplet) -> Result<(), CoreError> {
        self.organisations.adjust_load(connection, &triplet.organisation_id, -1).await?;
        if let Some(division_id) = &triplet.division_id {
            self.divisions.adjust_load(connection, division_id, -1).await?;
        }

        if let Some(staff_id) = &triplet.staff_id {
            let remaining = self.incidents.count_active_for_staff(connection, staff_id).await?;
            if remaining == 0 {
                // Best-effort: if the staffer already moved on (e.g. marked
                // off-duty concurrently), leave their availability alone.
                let _ = self
                    .staff
                    .set_availability(connection, staff_id, Availability::Busy, Availability::Available)
                    .await;
            }
        }

        Ok(())
    }

    /// Flips a staffer `Available -> Busy` in isolation. `accept` uses
    /// this directly rather than `acquire`: the FSM marks staff Busy only
    /// on acceptance, after `start_window` already moved the org and
    /// division load.
    pub async fn mark_staff_busy(&self, connection: &Connection, staff_id: &str) -> Result<(), CoreError> {
        self.staff
            .set_availability(connection, staff_id, Availability::Available, Availability::Busy)
            .await
            .map_err(|_| CoreError::StaleSnapshot(format!("staff {staff_id} is no longer available")))
    }

    /// Release-then-acquire, used by `reject` to move the load off the
    /// rejected org and onto the next candidate atomically within the
    /// same coordinator transaction.
    pub async fn rebalance(
        &self,
        connection: &Connection,
        old_triplet: &AssignmentTriplet,
        new_triplet: &AssignmentTriplet,
    ) -> Result<(), CoreError> {
        self.release(connection, old_triplet).await?;
        self.acquire(connection, new_triplet).await
    }
}
