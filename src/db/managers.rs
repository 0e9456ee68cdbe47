//! Manager repository — CRUD plus atomic load increments.

use std::collections::HashSet;

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use super::ports::ManagerRepositoryPort;
use crate::domain::{Manager, Position};
use crate::error::RouterError;

pub struct PgManagerRepository {
    pool: Pool,
}

impl PgManagerRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, manager: &Manager) -> Result<Manager, RouterError> {
        let client = self.pool.get().await?;
        let skills: Vec<String> = manager.skills.iter().cloned().collect();
        let row = client
            .query_one(
                "INSERT INTO managers (name, position, office_id, skills, current_load) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
                &[&manager.name, &manager.position.as_str(), &manager.office_id, &skills, &manager.current_load],
            )
            .await?;
        Ok(Manager { id: row.get(0), ..manager.clone() })
    }

    pub async fn get_by_id(&self, manager_id: i32) -> Result<Option<Manager>, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, name, position, office_id, skills, current_load FROM managers WHERE id = $1",
                &[&manager_id],
            )
            .await?;
        Ok(row.as_ref().map(row_to_manager))
    }

    pub async fn get_by_office(&self, office_id: i32) -> Result<Vec<Manager>, RouterError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, name, position, office_id, skills, current_load FROM managers WHERE office_id = $1 ORDER BY id",
                &[&office_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_manager).collect())
    }

    pub async fn get_all(&self) -> Result<Vec<Manager>, RouterError> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT id, name, position, office_id, skills, current_load FROM managers ORDER BY id", &[])
            .await?;
        Ok(rows.iter().map(row_to_manager).collect())
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Manager>, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, name, position, office_id, skills, current_load FROM managers WHERE name = $1",
                &[&name],
            )
            .await?;
        Ok(row.as_ref().map(row_to_manager))
    }

    pub async fn increment_load(&self, manager_id: i32) -> Result<(), RouterError> {
        let client = self.pool.get().await?;
        client
            .execute("UPDATE managers SET current_load = current_load + 1 WHERE id = $1", &[&manager_id])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ManagerRepositoryPort for PgManagerRepository {
    async fn save(&self, manager: &Manager) -> Result<Manager, RouterError> {
        PgManagerRepository::save(self, manager).await
    }

    async fn get_by_id(&self, manager_id: i32) -> Result<Option<Manager>, RouterError> {
        PgManagerRepository::get_by_id(self, manager_id).await
    }

    async fn get_by_office(&self, office_id: i32) -> Result<Vec<Manager>, RouterError> {
        PgManagerRepository::get_by_office(self, office_id).await
    }

    async fn get_all(&self) -> Result<Vec<Manager>, RouterError> {
        PgManagerRepository::get_all(self).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Manager>, RouterError> {
        PgManagerRepository::get_by_name(self, name).await
    }

    async fn increment_load(&self, manager_id: i32) -> Result<(), RouterError> {
        PgManagerRepository::increment_load(self, manager_id).await
    }
}

fn row_to_manager(row: &Row) -> Manager {
    let skills: Vec<String> = row.get(4);
    Manager {
        id: row.get(0),
        name: row.get(1),
        position: Position::from_str_loose(row.get::<_, &str>(2)).unwrap_or(Position::Specialist),
        office_id: row.get(3),
        skills: skills.into_iter().collect::<HashSet<_>>(),
        current_load: row.get(5),
    }
}
