use std::sync::Arc;

use serde::Serialize;

use crate::database::{DatabaseError, TechnicianStore};

pub const DENIED_MESSAGE: &str = "❌ Acesso negado! Seu número não está cadastrado ou está inativo no sistema. Entre em contato com o administrador.";

/// Public view of an authorized technician
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizedTechnician {
    pub nome: String,
    pub telefone: String,
}

/// Outcome of a chatbot access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Authorized(AuthorizedTechnician),
    Denied,
}

impl Verification {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Verification::Authorized(_))
    }

    pub fn message(&self) -> String {
        match self {
            Verification::Authorized(t) => format!(
                "✅ Acesso liberado! Olá {}, você está autorizado a usar o chatbot.",
                t.nome
            ),
            Verification::Denied => DENIED_MESSAGE.to_string(),
        }
    }
}

/// Answers whether a phone number belongs to an active technician
#[derive(Clone)]
pub struct AuthorizationChecker {
    store: Arc<dyn TechnicianStore>,
}

impl AuthorizationChecker {
    pub fn new(store: Arc<dyn TechnicianStore>) -> Self {
        Self { store }
    }

    /// Store failures are returned as errors, never folded into `Denied`.
    pub async fn check_technician(&self, phone: &str) -> Result<Verification, DatabaseError> {
        let found = self.store.find_active_by_phone(phone).await?;

        Ok(match found {
            Some(t) => {
                tracing::debug!("Phone {} authorized as technician {}", phone, t.id);
                Verification::Authorized(AuthorizedTechnician {
                    nome: t.name,
                    telefone: t.phone,
                })
            }
            None => {
                tracing::debug!("Phone {} denied", phone);
                Verification::Denied
            }
        })
    }
}
