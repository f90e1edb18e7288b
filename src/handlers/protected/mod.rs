// handlers/protected/mod.rs - Handlers mounted behind middleware::require_auth
//
// The guard has already resolved the caller; handlers read it from the
// `AuthUser` request extension.

pub mod auth;     // GET /auth/me
pub mod tecnicos; // POST /tecnicos, PUT /tecnicos/:id, DELETE /tecnicos/:id
