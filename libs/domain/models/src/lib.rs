// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS HUB (V1.0)
 * CLASIFICACIÓN: DOMAIN CONTRACTS (ESTRATO L2)
 * RESPONSABILIDAD: ENTIDADES COMPARTIDAS DEL NÚCLEO DE COORDINACIÓN
 *
 * Ningún otro crate del workspace define estas formas; el Store, el
 * Triage Service, el Assignment Engine, el Lifecycle Coordinator y el
 * pipeline de Ingestion leen y escriben exclusivamente a través de
 * estos tipos.
 * =================================================================
 */

pub mod audit;
pub mod dispatch_job;
pub mod division;
pub mod error;
pub mod facility;
pub mod incident;
pub mod organisation;
pub mod principal;
pub mod staff;
pub mod triage;

pub use audit::AuditEvent;
pub use dispatch_job::{DispatchJob, DispatchJobState, PriorityLane};
pub use division::{Division, DivisionStatus, DivisionType};
pub use error::CoreError;
pub use facility::{Facility, FacilityType};
pub use incident::{Incident, IncidentStatus};
pub use organisation::{Organisation, OrgCategory, OrgStatus, OrgType};
pub use principal::{Principal, Role};
pub use staff::{Availability, Staff, StaffRole, StaffStatus};
pub use triage::{TriageResult, TriageSource};
