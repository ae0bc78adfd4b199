// [libs/domain/assignment/src/snapshot.rs]
/*!
 * A `FleetSnapshot` is a consistent read of organisations, divisions
 * and staff taken once at the start of one `rank()` invocation. The
 * Assignment Engine never mutates
 * it and never re-reads the Store mid-decision; the Lifecycle
 * Coordinator re-validates the chosen row in its own transaction
 * before committing (`STALE_SNAPSHOT`).
 */

use aegis_domain_models::{Division, Organisation, Staff};

#[derive(Debug, Clone)]
pub struct FleetSnapshot {
    pub organisations: Vec<Organisation>,
    pub divisions: Vec<Division>,
    pub staff: Vec<Staff>,
}

impl FleetSnapshot {
    pub fn new(organisations: Vec<Organisation>, divisions: Vec<Division>, staff: Vec<Staff>) -> Self {
        Self { organisations, divisions, staff }
    }

    pub fn divisions_of(&self, org_id: &str) -> impl Iterator<Item = &Division> {
        self.divisions.iter().filter(move |d| d.organisation_id == org_id)
    }

    pub fn staff_of_division(&self, division_id: &str) -> impl Iterator<Item = &Staff> {
        self.staff.iter().filter(move |s| s.division_id.as_deref() == Some(division_id))
    }
}
