// [libs/infra/store/src/repositories/organisations.rs]
//! Organisation repository. Load fields are authoritative here; the
//! Workload Ledger (`libs/domain/lifecycle/src/ledger.rs`) is the only
//! caller allowed to move `current_load`.

use aegis_domain_models::{OrgCategory, OrgStatus, OrgType, Organisation};
use libsql::{params, Connection, Row};

use crate::errors::StoreError;

const SELECT_COLUMNS: &str =
    "id, name, org_type, category, region, latitude, longitude, capacity, current_load, status";

#[derive(Clone, Default)]
pub struct OrganisationRepository;

impl OrganisationRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(&self, connection: &Connection, org: &Organisation) -> Result<(), StoreError> {
        connection
            .execute(
                &format!("INSERT INTO organisations ({SELECT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)"),
                params![
                    org.id.clone(),
                    org.name.clone(),
                    org_type_str(org.org_type),
                    org.category.as_canonical_str(),
                    org.region.clone(),
                    org.latitude,
                    org.longitude,
                    org.capacity as i64,
                    org.current_load as i64,
                    org_status_str(org.status),
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    pub async fn find_by_id(&self, connection: &Connection, id: &str) -> Result<Option<Organisation>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM organisations WHERE id = ?1"), params![id.to_string()])
            .await
            .map_err(StoreError::Query)?;
        match rows.next().await.map_err(StoreError::Query)? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Every org not flagged `Inactive`, used to build the Assignment
    /// Engine's `FleetSnapshot`.
    pub async fn list_active(&self, connection: &Connection) -> Result<Vec<Organisation>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM organisations WHERE status != 'inactive'"), ())
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    pub async fn list_all(&self, connection: &Connection) -> Result<Vec<Organisation>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM organisations"), ())
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    /// Adjusts `current_load` by a signed delta and recomputes the
    /// derived status, atomically, so concurrent acquires/releases
    /// never clobber each other's increment.
    pub async fn adjust_load(&self, connection: &Connection, id: &str, delta: i64) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE organisations SET current_load = MAX(0, current_load + ?2),
                 status = CASE
                    WHEN status = 'inactive' THEN 'inactive'
                    WHEN MAX(0, current_load + ?2) >= capacity THEN 'overloaded'
                    WHEN MAX(0, current_load + ?2) = 0 THEN 'available'
                    ELSE 'active'
                 END
                 WHERE id = ?1",
                params![id.to_string(), delta],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("organisation {id} not found")));
        }
        Ok(())
    }

    /// Fleet-management update (`PUT /organizations/{id}`): everything
    /// but `current_load`, which only the Workload Ledger may move.
    pub async fn update(&self, connection: &Connection, org: &Organisation) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE organisations SET name = ?2, org_type = ?3, category = ?4, region = ?5, latitude = ?6, longitude = ?7, capacity = ?8, status = ?9 WHERE id = ?1",
                params![
                    org.id.clone(),
                    org.name.clone(),
                    org_type_str(org.org_type),
                    org.category.as_canonical_str(),
                    org.region.clone(),
                    org.latitude,
                    org.longitude,
                    org.capacity as i64,
                    org_status_str(org.status),
                ],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("organisation {} not found", org.id)));
        }
        Ok(())
    }

    pub async fn delete(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        let affected = connection
            .execute("DELETE FROM organisations WHERE id = ?1", params![id.to_string()])
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("organisation {id} not found")));
        }
        Ok(())
    }

    /// Overwrites `current_load` with a reconciled value rather than
    /// applying a delta — used only by the hourly reconciliation job
    /// once it has recomputed the true count from incident rows.
    pub async fn set_load(&self, connection: &Connection, id: &str, load: i64) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE organisations SET current_load = ?2,
                 status = CASE
                    WHEN status = 'inactive' THEN 'inactive'
                    WHEN ?2 >= capacity THEN 'overloaded'
                    WHEN ?2 = 0 THEN 'available'
                    ELSE 'active'
                 END
                 WHERE id = ?1",
                params![id.to_string(), load],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("organisation {id} not found")));
        }
        Ok(())
    }
}

fn org_type_str(t: OrgType) -> &'static str {
    match t {
        OrgType::Government => "government",
        OrgType::Ngo => "ngo",
        OrgType::VolunteerGroup => "volunteer_group",
        OrgType::Private => "private",
    }
}

fn parse_org_type(raw: &str) -> Result<OrgType, StoreError> {
    match raw {
        "government" => Ok(OrgType::Government),
        "ngo" => Ok(OrgType::Ngo),
        "volunteer_group" => Ok(OrgType::VolunteerGroup),
        "private" => Ok(OrgType::Private),
        other => Err(StoreError::Mapping(format!("unknown org_type '{other}'"))),
    }
}

fn parse_org_category(raw: &str) -> Result<OrgCategory, StoreError> {
    match raw {
        "emergency_response" => Ok(OrgCategory::EmergencyResponse),
        "medical" => Ok(OrgCategory::Medical),
        "relief" => Ok(OrgCategory::Relief),
        "logistics" => Ok(OrgCategory::Logistics),
        "rescue" => Ok(OrgCategory::Rescue),
        other => Err(StoreError::Mapping(format!("unknown org category '{other}'"))),
    }
}

fn org_status_str(s: OrgStatus) -> &'static str {
    match s {
        OrgStatus::Active => "active",
        OrgStatus::Available => "available",
        OrgStatus::Overloaded => "overloaded",
        OrgStatus::Inactive => "inactive",
    }
}

fn parse_org_status(raw: &str) -> Result<OrgStatus, StoreError> {
    match raw {
        "active" => Ok(OrgStatus::Active),
        "available" => Ok(OrgStatus::Available),
        "overloaded" => Ok(OrgStatus::Overloaded),
        "inactive" => Ok(OrgStatus::Inactive),
        other => Err(StoreError::Mapping(format!("unknown org status '{other}'"))),
    }
}

fn map_row(row: &Row) -> Result<Organisation, StoreError> {
    let org_type_raw: String = row.get(2).map_err(StoreError::Query)?;
    let category_raw: String = row.get(3).map_err(StoreError::Query)?;
    let status_raw: String = row.get(9).map_err(StoreError::Query)?;

    Ok(Organisation {
        id: row.get(0).map_err(StoreError::Query)?,
        name: row.get(1).map_err(StoreError::Query)?,
        org_type: parse_org_type(&org_type_raw)?,
        category: parse_org_category(&category_raw)?,
        region: row.get(4).map_err(StoreError::Query)?,
        latitude: row.get(5).map_err(StoreError::Query)?,
        longitude: row.get(6).map_err(StoreError::Query)?,
        capacity: row.get::<i64>(7).map_err(StoreError::Query)? as u32,
        current_load: row.get::<i64>(8).map_err(StoreError::Query)? as u32,
        status: parse_org_status(&status_raw)?,
    })
}
