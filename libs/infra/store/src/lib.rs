// [libs/infra/store/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN STORE (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ÚNICA FUENTE DE VERDAD RELACIONAL
 *
 * Envuelve libSQL (Turso-compatible) detrás de un `DbClient` y siete
 * repositorios de entidad. No contiene lógica de negocio: toda
 * decisión de transición de estado vive en `libs/domain/lifecycle`,
 * que consume estos repositorios como su frontera L3.
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;
pub mod time;

pub use client::DbClient;
pub use errors::StoreError;
pub use repositories::{
    AuditRepository, DispatchJobRepository, DivisionRepository, FacilityRepository, IncidentRepository,
    OrganisationRepository, StaffRepository,
};
