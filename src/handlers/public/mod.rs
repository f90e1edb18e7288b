// handlers/public/mod.rs - Handlers reachable without a bearer token

pub mod auth;      // POST /auth/login, POST /auth/logout
pub mod roles;     // GET /roles
pub mod system;    // GET /, GET /health, fallback
pub mod tecnicos;  // GET /tecnicos, GET /tecnicos/:id
pub mod verificar; // GET /verificar-tecnico/:telefone
