// [libs/infra/store/src/repositories/mod.rs]
pub mod audit;
pub mod dispatch_jobs;
pub mod divisions;
pub mod facilities;
pub mod incidents;
pub mod organisations;
pub mod staff;

pub use audit::AuditRepository;
pub use dispatch_jobs::DispatchJobRepository;
pub use divisions::DivisionRepository;
pub use facilities::FacilityRepository;
pub use incidents::IncidentRepository;
pub use organisations::OrganisationRepository;
pub use staff::StaffRepository;
