use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A whitelisted technician row from the `tecnicos` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Technician {
    pub id: i64,
    #[serde(rename = "nome")]
    #[sqlx(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone")]
    #[sqlx(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "ativo")]
    #[sqlx(rename = "ativo")]
    pub active: bool,
    #[serde(rename = "data_criacao")]
    #[sqlx(rename = "data_criacao")]
    pub created_at: DateTime<Utc>,
}

/// Request body for create and update. Every field is optional on the wire so
/// that missing fields surface as validation errors instead of JSON rejections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TechnicianPayload {
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub ativo: Option<bool>,
}

/// Validated input for an insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTechnician {
    pub name: String,
    pub phone: String,
    pub active: bool,
}

/// Validated full replacement of the mutable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicianChanges {
    pub name: String,
    pub phone: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
}

impl TechnicianPayload {
    /// Both `nome` and `telefone` must be present and non-blank. `ativo`
    /// defaults to true when absent.
    fn required_fields(&self) -> Result<(String, String, bool), ValidationError> {
        let name = required(self.nome.as_deref(), "nome")?;
        let phone = required(self.telefone.as_deref(), "telefone")?;
        Ok((name, phone, self.ativo.unwrap_or(true)))
    }

    pub fn into_new(self) -> Result<NewTechnician, ValidationError> {
        let (name, phone, active) = self.required_fields()?;
        Ok(NewTechnician { name, phone, active })
    }

    pub fn into_changes(self) -> Result<TechnicianChanges, ValidationError> {
        let (name, phone, active) = self.required_fields()?;
        Ok(TechnicianChanges { name, phone, active })
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::MissingRequiredField(field)),
    }
}
