// [libs/infra/store/src/repositories/divisions.rs]
//! Division repository, sibling of `organisations.rs`. Same
//! load/status bookkeeping pattern, one level down the fleet tree.

use std::collections::BTreeSet;

use aegis_domain_models::{Division, DivisionStatus, DivisionType};
use libsql::{params, Connection, Row};

use crate::errors::StoreError;

const SELECT_COLUMNS: &str =
    "id, organisation_id, division_type, description, capacity, current_load, status, skills_json";

#[derive(Clone, Default)]
pub struct DivisionRepository;

impl DivisionRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(&self, connection: &Connection, division: &Division) -> Result<(), StoreError> {
        let skills_json = serde_json::to_string(&division.skills).map_err(|e| StoreError::Mapping(e.to_string()))?;
        connection
            .execute(
                &format!("INSERT INTO divisions ({SELECT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)"),
                params![
                    division.id.clone(),
                    division.organisation_id.clone(),
                    division_type_str(division.division_type),
                    division.description.clone(),
                    division.capacity as i64,
                    division.current_load as i64,
                    division_status_str(division.status),
                    skills_json,
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    pub async fn find_by_id(&self, connection: &Connection, id: &str) -> Result<Option<Division>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM divisions WHERE id = ?1"), params![id.to_string()])
            .await
            .map_err(StoreError::Query)?;
        match rows.next().await.map_err(StoreError::Query)? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_organisation(
        &self,
        connection: &Connection,
        organisation_id: &str,
    ) -> Result<Vec<Division>, StoreError> {
        let mut rows = connection
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM divisions WHERE organisation_id = ?1"),
                params![organisation_id.to_string()],
            )
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    pub async fn list_all(&self, connection: &Connection) -> Result<Vec<Division>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM divisions"), ())
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    /// Fleet-management update (`PUT /divisions/{id}`): everything but
    /// `current_load`, which only the Workload Ledger may move.
    pub async fn update(&self, connection: &Connection, division: &Division) -> Result<(), StoreError> {
        let skills_json = serde_json::to_string(&division.skills).map_err(|e| StoreError::Mapping(e.to_string()))?;
        let affected = connection
            .execute(
                "UPDATE divisions SET division_type = ?2, description = ?3, capacity = ?4, status = ?5, skills_json = ?6 WHERE id = ?1",
                params![
                    division.id.clone(),
                    division_type_str(division.division_type),
                    division.description.clone(),
                    division.capacity as i64,
                    division_status_str(division.status),
                    skills_json,
                ],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("division {} not found", division.id)));
        }
        Ok(())
    }

    pub async fn delete(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        let affected = connection
            .execute("DELETE FROM divisions WHERE id = ?1", params![id.to_string()])
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("division {id} not found")));
        }
        Ok(())
    }

    pub async fn adjust_load(&self, connection: &Connection, id: &str, delta: i64) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE divisions SET current_load = MAX(0, current_load + ?2) WHERE id = ?1",
                params![id.to_string(), delta],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("division {id} not found")));
        }
        Ok(())
    }

    pub async fn set_load(&self, connection: &Connection, id: &str, load: i64) -> Result<(), StoreError> {
        let affected = connection
            .execute("UPDATE divisions SET current_load = ?2 WHERE id = ?1", params![id.to_string(), load])
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("division {id} not found")));
        }
        Ok(())
    }
}

fn division_type_str(t: DivisionType) -> &'static str {
    match t {
        DivisionType::Medical => "medical",
        DivisionType::Rescue => "rescue",
        DivisionType::Logistics => "logistics",
        DivisionType::Communication => "communication",
        DivisionType::EmergencyResponse => "emergency_response",
    }
}

fn parse_division_type(raw: &str) -> Result<DivisionType, StoreError> {
    match raw {
        "medical" => Ok(DivisionType::Medical),
        "rescue" => Ok(DivisionType::Rescue),
        "logistics" => Ok(DivisionType::Logistics),
        "communication" => Ok(DivisionType::Communication),
        "emergency_response" => Ok(DivisionType::EmergencyResponse),
        other => Err(StoreError::Mapping(format!("unknown division_type '{other}'"))),
    }
}

fn division_status_str(s: DivisionStatus) -> &'static str {
    match s {
        DivisionStatus::Active => "active",
        DivisionStatus::Inactive => "inactive",
    }
}

fn parse_division_status(raw: &str) -> Result<DivisionStatus, StoreError> {
    match raw {
        "active" => Ok(DivisionStatus::Active),
        "inactive" => Ok(DivisionStatus::Inactive),
        other => Err(StoreError::Mapping(format!("unknown division status '{other}'"))),
    }
}

fn map_row(row: &Row) -> Result<Division, StoreError> {
    let division_type_raw: String = row.get(2).map_err(StoreError::Query)?;
    let status_raw: String = row.get(6).map_err(StoreError::Query)?;
    let skills_json: String = row.get(7).map_err(StoreError::Query)?;
    let skills: BTreeSet<String> = serde_json::from_str(&skills_json).map_err(|e| StoreError::Mapping(e.to_string()))?;

    Ok(Division {
        id: row.get(0).map_err(StoreError::Query)?,
        organisation_id: row.get(1).map_err(StoreError::Query)?,
        division_type: parse_division_type(&division_type_raw)?,
        description: row.get(3).map_err(StoreError::Query)?,
        capacity: row.get::<i64>(4).map_err(StoreError::Query)? as u32,
        current_load: row.get::<i64>(5).map_err(StoreError::Query)? as u32,
        status: parse_division_status(&status_raw)?,
        skills,
    })
}
