use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTechnician, Technician, TechnicianChanges};
use crate::database::repository::TechnicianStore;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Technician>,
}

impl Table {
    fn phone_taken(&self, phone: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|t| t.phone == phone && Some(t.id) != except)
    }
}

/// In-process technician store used for local development and tests.
/// Mirrors the Postgres table: serial ids, insert timestamps and the unique
/// phone constraint (checked under the write lock).
#[derive(Default)]
pub struct MemoryTechnicianStore {
    table: RwLock<Table>,
    failing: AtomicBool,
}

impl MemoryTechnicianStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("record store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TechnicianStore for MemoryTechnicianStore {
    async fn list(&self) -> Result<Vec<Technician>, DatabaseError> {
        self.check_available()?;
        let table = self.table.read().await;
        let mut rows: Vec<Technician> = table.rows.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Technician>, DatabaseError> {
        self.check_available()?;
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_active_by_phone(&self, phone: &str) -> Result<Option<Technician>, DatabaseError> {
        self.check_available()?;
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|t| t.phone == phone && t.active)
            .cloned())
    }

    async fn insert(&self, new: NewTechnician) -> Result<Technician, DatabaseError> {
        self.check_available()?;
        let mut table = self.table.write().await;
        if table.phone_taken(&new.phone, None) {
            return Err(DatabaseError::DuplicatePhone(new.phone));
        }

        table.next_id += 1;
        let technician = Technician {
            id: table.next_id,
            name: new.name,
            phone: new.phone,
            active: new.active,
            created_at: Utc::now(),
        };
        table.rows.insert(technician.id, technician.clone());
        Ok(technician)
    }

    async fn update(&self, id: i64, changes: TechnicianChanges) -> Result<Option<Technician>, DatabaseError> {
        self.check_available()?;
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if table.phone_taken(&changes.phone, Some(id)) {
            return Err(DatabaseError::DuplicatePhone(changes.phone));
        }

        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.name = changes.name;
        row.phone = changes.phone;
        row.active = changes.active;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.check_available()?;
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new(name: &str, phone: &str) -> NewTechnician {
        NewTechnician { name: name.into(), phone: phone.into(), active: true }
    }

    fn changes(name: &str, phone: &str, active: bool) -> TechnicianChanges {
        TechnicianChanges { name: name.into(), phone: phone.into(), active }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let store = MemoryTechnicianStore::new();
        let a = store.insert(new("Ana", "1")).await.unwrap();
        let b = store.insert(new("Bruno", "2")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn rejects_duplicate_phone_on_insert() {
        let store = MemoryTechnicianStore::new();
        store.insert(new("Ana", "123")).await.unwrap();
        let err = store.insert(new("Outra", "123")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicatePhone(p) if p == "123"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn rejects_duplicate_phone_on_update_but_allows_keeping_own() {
        let store = MemoryTechnicianStore::new();
        let a = store.insert(new("Ana", "1")).await.unwrap();
        store.insert(new("Bruno", "2")).await.unwrap();

        let err = store.update(a.id, changes("Ana", "2", true)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicatePhone(_)));

        let updated = store.update(a.id, changes("Ana Maria", "1", false)).await.unwrap().unwrap();
        assert_eq!(updated.name, "Ana Maria");
        assert!(!updated.active);
        assert_eq!(updated.created_at, a.created_at);
    }

    #[tokio::test]
    async fn update_of_missing_id_returns_none() {
        let store = MemoryTechnicianStore::new();
        assert!(store.update(99, changes("X", "1", true)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryTechnicianStore::new();
        let a = store.insert(new("Ana", "1")).await.unwrap();
        let b = store.insert(new("Bruno", "2")).await.unwrap();
        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn active_lookup_skips_inactive_rows() {
        let store = MemoryTechnicianStore::new();
        let a = store.insert(new("Ana", "1")).await.unwrap();
        assert!(store.find_active_by_phone("1").await.unwrap().is_some());

        store.update(a.id, changes("Ana", "1", false)).await.unwrap();
        assert!(store.find_active_by_phone("1").await.unwrap().is_none());
        assert!(store.find_by_id(a.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = MemoryTechnicianStore::new();
        let a = store.insert(new("Ana", "1")).await.unwrap();
        assert!(!store.delete(a.id + 1).await.unwrap());
        assert_eq!(store.len().await, 1);
        assert!(store.delete(a.id).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn failing_store_errors_every_call() {
        let store = MemoryTechnicianStore::new();
        store.set_failing(true);
        assert!(store.list().await.is_err());
        assert!(store.health_check().await.is_err());
        store.set_failing(false);
        assert!(store.health_check().await.is_ok());
    }
}
