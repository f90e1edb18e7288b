pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryTechnicianStore;
pub use models::{NewTechnician, Technician, TechnicianChanges, TechnicianPayload, ValidationError};
pub use repository::{PgTechnicianStore, TechnicianStore};
