// [libs/infra/store/src/repositories/staff.rs]
//! Staff repository.

use std::collections::BTreeSet;

use aegis_domain_models::{Availability, Staff, StaffRole, StaffStatus};
use libsql::{params, Connection, Row};

use crate::errors::StoreError;

const SELECT_COLUMNS: &str =
    "id, organisation_id, division_id, role, skills_json, contact, availability, latitude, longitude, status";

#[derive(Clone, Default)]
pub struct StaffRepository;

impl StaffRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(&self, connection: &Connection, staff: &Staff) -> Result<(), StoreError> {
        let skills_json = serde_json::to_string(&staff.skills).map_err(|e| StoreError::Mapping(e.to_string()))?;
        connection
            .execute(
                &format!("INSERT INTO staff ({SELECT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)"),
                params![
                    staff.id.clone(),
                    staff.organisation_id.clone(),
                    staff.division_id.clone(),
                    role_str(staff.role),
                    skills_json,
                    staff.contact.clone(),
                    availability_str(staff.availability),
                    staff.latitude,
                    staff.longitude,
                    status_str(staff.status),
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    pub async fn find_by_id(&self, connection: &Connection, id: &str) -> Result<Option<Staff>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM staff WHERE id = ?1"), params![id.to_string()])
            .await
            .map_err(StoreError::Query)?;
        match rows.next().await.map_err(StoreError::Query)? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_division(&self, connection: &Connection, division_id: &str) -> Result<Vec<Staff>, StoreError> {
        let mut rows = connection
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM staff WHERE division_id = ?1"),
                params![division_id.to_string()],
            )
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    pub async fn list_all(&self, connection: &Connection) -> Result<Vec<Staff>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM staff"), ())
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    /// Fleet-management update (`PUT /staff/{id}`): everything but
    /// `availability`, which only the Workload Ledger may move.
    pub async fn update(&self, connection: &Connection, staff: &Staff) -> Result<(), StoreError> {
        let skills_json = serde_json::to_string(&staff.skills).map_err(|e| StoreError::Mapping(e.to_string()))?;
        let affected = connection
            .execute(
                "UPDATE staff SET organisation_id = ?2, division_id = ?3, role = ?4, skills_json = ?5, contact = ?6, latitude = ?7, longitude = ?8, status = ?9 WHERE id = ?1",
                params![
                    staff.id.clone(),
                    staff.organisation_id.clone(),
                    staff.division_id.clone(),
                    role_str(staff.role),
                    skills_json,
                    staff.contact.clone(),
                    staff.latitude,
                    staff.longitude,
                    status_str(staff.status),
                ],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("staff {} not found", staff.id)));
        }
        Ok(())
    }

    pub async fn delete(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        let affected = connection
            .execute("DELETE FROM staff WHERE id = ?1", params![id.to_string()])
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("staff {id} not found")));
        }
        Ok(())
    }

    /// Conditional flip used on accept/complete/cancel: only moves a
    /// staffer out of `Available` if they are still `Available`, so a
    /// concurrent assignment can't double-book them.
    pub async fn set_availability(
        &self,
        connection: &Connection,
        id: &str,
        expected: Availability,
        next: Availability,
    ) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE staff SET availability = ?3 WHERE id = ?1 AND availability = ?2",
                params![id.to_string(), availability_str(expected), availability_str(next)],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::Conflict(format!("staff {id} is not {}", availability_str(expected))));
        }
        Ok(())
    }
}

fn role_str(r: StaffRole) -> &'static str {
    match r {
        StaffRole::Manager => "manager",
        StaffRole::Specialist => "specialist",
        StaffRole::Worker => "worker",
        StaffRole::Volunteer => "volunteer",
    }
}

fn parse_role(raw: &str) -> Result<StaffRole, StoreError> {
    match raw {
        "manager" => Ok(StaffRole::Manager),
        "specialist" => Ok(StaffRole::Specialist),
        "worker" => Ok(StaffRole::Worker),
        "volunteer" => Ok(StaffRole::Volunteer),
        other => Err(StoreError::Mapping(format!("unknown staff role '{other}'"))),
    }
}

fn availability_str(a: Availability) -> &'static str {
    match a {
        Availability::Available => "available",
        Availability::Busy => "busy",
        Availability::OffDuty => "off_duty",
    }
}

fn parse_availability(raw: &str) -> Result<Availability, StoreError> {
    match raw {
        "available" => Ok(Availability::Available),
        "busy" => Ok(Availability::Busy),
        "off_duty" => Ok(Availability::OffDuty),
        other => Err(StoreError::Mapping(format!("unknown availability '{other}'"))),
    }
}

fn status_str(s: StaffStatus) -> &'static str {
    match s {
        StaffStatus::Active => "active",
        StaffStatus::Inactive => "inactive",
    }
}

fn parse_status(raw: &str) -> Result<StaffStatus, StoreError> {
    match raw {
        "active" => Ok(StaffStatus::Active),
        "inactive" => Ok(StaffStatus::Inactive),
        other => Err(StoreError::Mapping(format!("unknown staff status '{other}'"))),
    }
}

fn map_row(row: &Row) -> Result<Staff, StoreError> {
    let role_raw: String = row.get(3).map_err(StoreError::Query)?;
    let skills_json: String = row.get(4).map_err(StoreError::Query)?;
    let skills: BTreeSet<String> = serde_json::from_str(&skills_json).map_err(|e| StoreError::Mapping(e.to_string()))?;
    let availability_raw: String = row.get(6).map_err(StoreError::Query)?;
    let status_raw: String = row.get(9).map_err(StoreError::Query)?;

    Ok(Staff {
        id: row.get(0).map_err(StoreError::Query)?,
        organisation_id: row.get(1).map_err(StoreError::Query)?,
        division_id: row.get(2).map_err(StoreError::Query)?,
        role: parse_role(&role_raw)?,
        skills,
        contact: row.get(5).map_err(StoreError::Query)?,
        availability: parse_availability(&availability_raw)?,
        latitude: row.get(7).map_err(StoreError::Query)?,
        longitude: row.get(8).map_err(StoreError::Query)?,
        status: parse_status(&status_raw)?,
    })
}
