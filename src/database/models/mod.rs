pub mod technician;

pub use technician::{NewTechnician, Technician, TechnicianChanges, TechnicianPayload, ValidationError};
