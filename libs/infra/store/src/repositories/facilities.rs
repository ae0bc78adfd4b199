// [libs/infra/store/src/repositories/facilities.rs]
//! Facility repository. Read-only surface backing
//! `/sos/{id}/nearest-facilities`; nothing in the core ever writes a
//! facility row after seeding.

use aegis_domain_models::{Facility, FacilityType};
use libsql::{params, Connection, Row};

use crate::errors::StoreError;

const SELECT_COLUMNS: &str =
    "id, facility_type, latitude, longitude, capacity, current_occupancy, beds_available, icu_beds_available";

#[derive(Clone, Default)]
pub struct FacilityRepository;

impl FacilityRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(&self, connection: &Connection, facility: &Facility) -> Result<(), StoreError> {
        connection
            .execute(
                &format!("INSERT INTO facilities ({SELECT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)"),
                params![
                    facility.id.clone(),
                    facility_type_str(facility.facility_type),
                    facility.latitude,
                    facility.longitude,
                    facility.capacity as i64,
                    facility.current_occupancy as i64,
                    facility.beds_available as i64,
                    facility.icu_beds_available.map(|v| v as i64),
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    pub async fn list_all(&self, connection: &Connection) -> Result<Vec<Facility>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM facilities"), ())
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }
}

fn facility_type_str(t: FacilityType) -> &'static str {
    match t {
        FacilityType::Shelter => "shelter",
        FacilityType::Hospital => "hospital",
    }
}

fn parse_facility_type(raw: &str) -> Result<FacilityType, StoreError> {
    match raw {
        "shelter" => Ok(FacilityType::Shelter),
        "hospital" => Ok(FacilityType::Hospital),
        other => Err(StoreError::Mapping(format!("unknown facility_type '{other}'"))),
    }
}

fn map_row(row: &Row) -> Result<Facility, StoreError> {
    let facility_type_raw: String = row.get(1).map_err(StoreError::Query)?;
    let icu_beds: Option<i64> = row.get(7).map_err(StoreError::Query)?;

    Ok(Facility {
        id: row.get(0).map_err(StoreError::Query)?,
        facility_type: parse_facility_type(&facility_type_raw)?,
        latitude: row.get(2).map_err(StoreError::Query)?,
        longitude: row.get(3).map_err(StoreError::Query)?,
        capacity: row.get::<i64>(4).map_err(StoreError::Query)? as u32,
        current_occupancy: row.get::<i64>(5).map_err(StoreError::Query)? as u32,
        beds_available: row.get::<i64>(6).map_err(StoreError::Query)? as u32,
        icu_beds_available: icu_beds.map(|v| v as u32),
    })
}
