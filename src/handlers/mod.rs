// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token checked by middleware::require_auth)
//
// Technician reads are public so the whitelist can be inspected without a
// session; every mutation lives under `protected`.
pub mod public;
pub mod protected;
