use axum::Json;
use serde::Serialize;

/// A role descriptor. The catalogue is informational only; no route checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Role {
    pub nome: &'static str,
    pub descricao: &'static str,
}

pub static ROLES: [Role; 3] = [
    Role {
        nome: "admin",
        descricao: "Administrador do sistema - acesso total",
    },
    Role {
        nome: "tecnico",
        descricao: "Técnico autorizado - acesso ao chatbot",
    },
    Role {
        nome: "supervisor",
        descricao: "Supervisor de técnicos - pode gerenciar técnicos",
    },
];

/// GET /roles
pub async fn list() -> Json<&'static [Role]> {
    Json(&ROLES[..])
}
