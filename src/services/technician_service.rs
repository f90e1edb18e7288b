use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::database::{DatabaseError, Technician, TechnicianPayload, TechnicianStore, ValidationError};

#[derive(Debug, Error)]
pub enum TechnicianError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Technician not found: {0}")]
    NotFound(String),

    #[error("Phone number already registered: {0}")]
    DuplicatePhone(String),

    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        source: DatabaseError,
    },
}

/// Wrap a store failure with the user-facing context of the operation,
/// keeping uniqueness violations as their own case.
fn store_error(context: &'static str) -> impl FnOnce(DatabaseError) -> TechnicianError {
    move |err| match err {
        DatabaseError::DuplicatePhone(phone) => TechnicianError::DuplicatePhone(phone),
        source => TechnicianError::Store { context, source },
    }
}

/// Ids are store-assigned integers; anything else cannot match a row.
fn parse_id(raw: &str) -> Result<i64, TechnicianError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| TechnicianError::NotFound(raw.to_string()))
}

/// CRUD over technician records. Input is validated before any store call.
#[derive(Clone)]
pub struct TechnicianService {
    store: Arc<dyn TechnicianStore>,
}

impl TechnicianService {
    pub fn new(store: Arc<dyn TechnicianStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Technician>, TechnicianError> {
        self.store
            .list()
            .await
            .map_err(store_error("Erro ao buscar técnicos"))
    }

    pub async fn get(&self, id: &str) -> Result<Technician, TechnicianError> {
        let id = parse_id(id)?;
        self.store
            .find_by_id(id)
            .await
            .map_err(store_error("Erro ao buscar técnico"))?
            .ok_or_else(|| TechnicianError::NotFound(id.to_string()))
    }

    pub async fn create(&self, payload: TechnicianPayload) -> Result<Technician, TechnicianError> {
        let new = payload.into_new()?;
        let technician = self
            .store
            .insert(new)
            .await
            .map_err(store_error("Erro ao criar técnico"))?;

        info!("Created technician {} ({})", technician.id, technician.phone);
        Ok(technician)
    }

    pub async fn update(&self, id: &str, payload: TechnicianPayload) -> Result<Technician, TechnicianError> {
        let changes = payload.into_changes()?;
        let id = parse_id(id)?;
        let technician = self
            .store
            .update(id, changes)
            .await
            .map_err(store_error("Erro ao atualizar técnico"))?
            .ok_or_else(|| TechnicianError::NotFound(id.to_string()))?;

        info!("Updated technician {} (active={})", technician.id, technician.active);
        Ok(technician)
    }

    pub async fn delete(&self, id: &str) -> Result<(), TechnicianError> {
        let id = parse_id(id)?;
        let removed = self
            .store
            .delete(id)
            .await
            .map_err(store_error("Erro ao deletar técnico"))?;

        if !removed {
            return Err(TechnicianError::NotFound(id.to_string()));
        }

        info!("Deleted technician {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryTechnicianStore;

    fn payload(nome: Option<&str>, telefone: Option<&str>, ativo: Option<bool>) -> TechnicianPayload {
        TechnicianPayload {
            nome: nome.map(str::to_string),
            telefone: telefone.map(str::to_string),
            ativo,
        }
    }

    fn service() -> (Arc<MemoryTechnicianStore>, TechnicianService) {
        let store = Arc::new(MemoryTechnicianStore::new());
        (store.clone(), TechnicianService::new(store))
    }

    #[tokio::test]
    async fn validation_runs_before_the_store() {
        let (store, service) = service();
        store.set_failing(true);

        let err = service.create(payload(None, Some("1"), None)).await.unwrap_err();
        assert!(matches!(err, TechnicianError::Validation(_)));

        let err = service.update("1", payload(Some("Ana"), None, None)).await.unwrap_err();
        assert!(matches!(err, TechnicianError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_phone_surfaces_as_conflict() {
        let (store, service) = service();
        service.create(payload(Some("Ana"), Some("123"), None)).await.unwrap();
        let err = service.create(payload(Some("Bia"), Some("123"), None)).await.unwrap_err();
        assert!(matches!(err, TechnicianError::DuplicatePhone(p) if p == "123"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn non_numeric_ids_are_not_found() {
        let (_, service) = service();
        assert!(matches!(service.get("abc").await, Err(TechnicianError::NotFound(_))));
        assert!(matches!(service.delete("1; DROP TABLE").await, Err(TechnicianError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_without_ativo_reactivates() {
        let (_, service) = service();
        let t = service.create(payload(Some("Ana"), Some("1"), Some(false))).await.unwrap();
        assert!(!t.active);

        let updated = service
            .update(&t.id.to_string(), payload(Some("Ana"), Some("1"), None))
            .await
            .unwrap();
        assert!(updated.active);
    }

    #[tokio::test]
    async fn delete_of_missing_id_keeps_row_count() {
        let (store, service) = service();
        let t = service.create(payload(Some("Ana"), Some("1"), None)).await.unwrap();
        let missing = (t.id + 100).to_string();
        assert!(matches!(service.delete(&missing).await, Err(TechnicianError::NotFound(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn store_failure_keeps_operation_context() {
        let (store, service) = service();
        store.set_failing(true);
        match service.list().await {
            Err(TechnicianError::Store { context, .. }) => assert_eq!(context, "Erro ao buscar técnicos"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
