//! Office repository — CRUD over the `offices` table.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use super::ports::OfficeRepositoryPort;
use crate::domain::{GeoPoint, Office};
use crate::error::RouterError;

pub struct PgOfficeRepository {
    pool: Pool,
}

impl PgOfficeRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, office: &Office) -> Result<Office, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO offices (name, address, latitude, longitude) VALUES ($1, $2, $3, $4) \
                 RETURNING id",
                &[
                    &office.name,
                    &office.address,
                    &office.location.map(|l| l.latitude),
                    &office.location.map(|l| l.longitude),
                ],
            )
            .await?;
        Ok(Office { id: row.get(0), ..office.clone() })
    }

    pub async fn get_by_id(&self, office_id: i32) -> Result<Option<Office>, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, name, address, latitude, longitude FROM offices WHERE id = $1", &[&office_id])
            .await?;
        Ok(row.as_ref().map(row_to_office))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Office>, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, name, address, latitude, longitude FROM offices WHERE name = $1", &[&name])
            .await?;
        Ok(row.as_ref().map(row_to_office))
    }

    pub async fn get_all(&self) -> Result<Vec<Office>, RouterError> {
        let client = self.pool.get().await?;
        let rows = client.query("SELECT id, name, address, latitude, longitude FROM offices ORDER BY id", &[]).await?;
        Ok(rows.iter().map(row_to_office).collect())
    }

    /// Persist a resolved geocode onto an existing office.
    pub async fn update_location(&self, office_id: i32, location: GeoPoint) -> Result<(), RouterError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "UPDATE offices SET latitude = $1, longitude = $2 WHERE id = $3",
                &[&location.latitude, &location.longitude, &office_id],
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OfficeRepositoryPort for PgOfficeRepository {
    async fn save(&self, office: &Office) -> Result<Office, RouterError> {
        PgOfficeRepository::save(self, office).await
    }

    async fn get_by_id(&self, office_id: i32) -> Result<Option<Office>, RouterError> {
        PgOfficeRepository::get_by_id(self, office_id).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Office>, RouterError> {
        PgOfficeRepository::get_by_name(self, name).await
    }

    async fn get_all(&self) -> Result<Vec<Office>, RouterError> {
        PgOfficeRepository::get_all(self).await
    }

    async fn update_location(&self, office_id: i32, location: GeoPoint) -> Result<(), RouterError> {
        PgOfficeRepository::update_location(self, office_id, location).await
    }
}

fn row_to_office(row: &Row) -> Office {
    let lat: Option<f64> = row.get(3);
    let lon: Option<f64> = row.get(4);
    Office {
        id: row.get(0),
        name: row.get(1),
        address: row.get(2),
        location: lat.zip(lon).map(|(latitude, longitude)| GeoPoint { latitude, longitude }),
    }
}
