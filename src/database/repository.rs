use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewTechnician, Technician, TechnicianChanges};

/// Access to the technician table. Uniqueness of `telefone` is enforced by the
/// implementation and reported as `DatabaseError::DuplicatePhone`.
#[async_trait]
pub trait TechnicianStore: Send + Sync {
    /// All technicians, newest first
    async fn list(&self) -> Result<Vec<Technician>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Technician>, DatabaseError>;

    /// First active technician registered under `phone`
    async fn find_active_by_phone(&self, phone: &str) -> Result<Option<Technician>, DatabaseError>;

    async fn insert(&self, new: NewTechnician) -> Result<Technician, DatabaseError>;

    /// Returns `None` when no row has this id
    async fn update(&self, id: i64, changes: TechnicianChanges) -> Result<Option<Technician>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn close(&self) {}
}

// `id` is SERIAL (int4); widen it so it decodes into `Technician::id`
const COLUMNS: &str = "id::int8 AS id, nome, telefone, ativo, data_criacao";

/// Postgres-backed technician store
#[derive(Clone)]
pub struct PgTechnicianStore {
    pool: PgPool,
}

impl PgTechnicianStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TechnicianStore for PgTechnicianStore {
    async fn list(&self) -> Result<Vec<Technician>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM tecnicos ORDER BY data_criacao DESC");
        let rows = sqlx::query_as::<_, Technician>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Technician>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM tecnicos WHERE id = $1");
        let row = sqlx::query_as::<_, Technician>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_active_by_phone(&self, phone: &str) -> Result<Option<Technician>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM tecnicos WHERE telefone = $1 AND ativo = true LIMIT 1");
        let row = sqlx::query_as::<_, Technician>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, new: NewTechnician) -> Result<Technician, DatabaseError> {
        let sql = format!("INSERT INTO tecnicos (nome, telefone, ativo) VALUES ($1, $2, $3) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Technician>(&sql)
            .bind(&new.name)
            .bind(&new.phone)
            .bind(new.active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, &new.phone))
    }

    async fn update(&self, id: i64, changes: TechnicianChanges) -> Result<Option<Technician>, DatabaseError> {
        let sql = format!(
            "UPDATE tecnicos SET nome = $1, telefone = $2, ativo = $3 WHERE id = $4 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Technician>(&sql)
            .bind(&changes.name)
            .bind(&changes.phone)
            .bind(changes.active)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, &changes.phone))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tecnicos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn close(&self) {
        DatabaseManager::close(&self.pool).await;
    }
}
