pub mod authorization;
pub mod technician_service;

pub use authorization::{AuthorizationChecker, AuthorizedTechnician, Verification};
pub use technician_service::{TechnicianError, TechnicianService};
