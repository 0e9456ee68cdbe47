//! Ticket repository — CRUD plus the unprocessed-ticket query driving the
//! batch pipeline.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use super::ports::TicketRepositoryPort;
use crate::domain::{GeoStatus, GeoPoint, Segment, Ticket};
use crate::error::RouterError;

pub struct PgTicketRepository {
    pool: Pool,
}

const COLUMNS: &str = "id, guid, gender, birth_date, description, attachments, segment, \
     country, region, city, street, building, client_lat, client_lon, geo_status";

impl PgTicketRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, ticket: &Ticket) -> Result<Ticket, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO tickets (guid, gender, birth_date, description, attachments, segment, \
                 country, region, city, street, building, client_lat, client_lon, geo_status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING id",
                &[
                    &ticket.guid,
                    &ticket.gender,
                    &ticket.birth_date,
                    &ticket.description,
                    &ticket.attachments,
                    &ticket.segment.as_str(),
                    &ticket.country,
                    &ticket.region,
                    &ticket.city,
                    &ticket.street,
                    &ticket.building,
                    &ticket.client_location.map(|l| l.latitude),
                    &ticket.client_location.map(|l| l.longitude),
                    &ticket.geo_status.as_str(),
                ],
            )
            .await?;
        Ok(Ticket { id: row.get(0), ..ticket.clone() })
    }

    pub async fn get_by_id(&self, ticket_id: i32) -> Result<Option<Ticket>, RouterError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        let row = client.query_opt(&sql, &[&ticket_id]).await?;
        Ok(row.as_ref().map(row_to_ticket))
    }

    pub async fn get_by_guid(&self, guid: &str) -> Result<Option<Ticket>, RouterError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {COLUMNS} FROM tickets WHERE guid = $1");
        let row = client.query_opt(&sql, &[&guid]).await?;
        Ok(row.as_ref().map(row_to_ticket))
    }

    pub async fn get_all(&self) -> Result<Vec<Ticket>, RouterError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {COLUMNS} FROM tickets ORDER BY id");
        let rows = client.query(&sql, &[]).await?;
        Ok(rows.iter().map(row_to_ticket).collect())
    }

    /// Tickets that have not yet been classified — left join against
    /// `ticket_analytics`, filtered to the unmatched side.
    pub async fn get_unprocessed(&self) -> Result<Vec<Ticket>, RouterError> {
        let client = self.pool.get().await?;
        let sql = "SELECT t.id, t.guid, t.gender, t.birth_date, t.description, t.attachments, t.segment, \
             t.country, t.region, t.city, t.street, t.building, t.client_lat, t.client_lon, t.geo_status \
             FROM tickets t LEFT JOIN ticket_analytics a ON a.ticket_id = t.id \
             WHERE a.id IS NULL ORDER BY t.id";
        let rows = client.query(sql, &[]).await?;
        Ok(rows.iter().map(row_to_ticket).collect())
    }

    pub async fn update(&self, ticket: &Ticket) -> Result<(), RouterError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "UPDATE tickets SET client_lat = $1, client_lon = $2, geo_status = $3 WHERE id = $4",
                &[
                    &ticket.client_location.map(|l| l.latitude),
                    &ticket.client_location.map(|l| l.longitude),
                    &ticket.geo_status.as_str(),
                    &ticket.id,
                ],
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TicketRepositoryPort for PgTicketRepository {
    async fn save(&self, ticket: &Ticket) -> Result<Ticket, RouterError> {
        PgTicketRepository::save(self, ticket).await
    }

    async fn get_by_id(&self, ticket_id: i32) -> Result<Option<Ticket>, RouterError> {
        PgTicketRepository::get_by_id(self, ticket_id).await
    }

    async fn get_by_guid(&self, guid: &str) -> Result<Option<Ticket>, RouterError> {
        PgTicketRepository::get_by_guid(self, guid).await
    }

    async fn get_all(&self) -> Result<Vec<Ticket>, RouterError> {
        PgTicketRepository::get_all(self).await
    }

    async fn get_unprocessed(&self) -> Result<Vec<Ticket>, RouterError> {
        PgTicketRepository::get_unprocessed(self).await
    }

    async fn update(&self, ticket: &Ticket) -> Result<(), RouterError> {
        PgTicketRepository::update(self, ticket).await
    }
}

fn row_to_ticket(row: &Row) -> Ticket {
    let lat: Option<f64> = row.get(12);
    let lon: Option<f64> = row.get(13);
    Ticket {
        id: row.get(0),
        guid: row.get(1),
        gender: row.get(2),
        birth_date: row.get(3),
        description: row.get(4),
        attachments: row.get(5),
        segment: Segment::from_str_loose(row.get::<_, &str>(6)).unwrap_or(Segment::Mass),
        country: row.get(7),
        region: row.get(8),
        city: row.get(9),
        street: row.get(10),
        building: row.get(11),
        client_location: lat.zip(lon).map(|(latitude, longitude)| GeoPoint { latitude, longitude }),
        geo_status: GeoStatus::from_str_loose(row.get::<_, &str>(14)).unwrap_or(GeoStatus::Pending),
    }
}
