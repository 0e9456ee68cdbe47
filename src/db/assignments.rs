//! Assignment repository — persists the routing decision per ticket.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use super::ports::AssignmentRepositoryPort;
use crate::domain::{Assignment, Manager};
use crate::error::RouterError;
use crate::policy::pick_next;

pub struct PgAssignmentRepository {
    pool: Pool,
}

impl PgAssignmentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, assignment: &Assignment) -> Result<Assignment, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO assignments (ticket_id, manager_id, office_id, distance_km, \
                 assignment_reason, fallback_used) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                &[
                    &assignment.ticket_id,
                    &assignment.manager_id,
                    &assignment.office_id,
                    &assignment.distance_km,
                    &assignment.reason,
                    &assignment.fallback_used,
                ],
            )
            .await?;
        Ok(Assignment { id: Some(row.get(0)), ..assignment.clone() })
    }

    pub async fn get_by_ticket(&self, ticket_id: i32) -> Result<Option<Assignment>, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, ticket_id, manager_id, office_id, distance_km, assignment_reason, fallback_used \
                 FROM assignments WHERE ticket_id = $1",
                &[&ticket_id],
            )
            .await?;
        Ok(row.as_ref().map(row_to_assignment))
    }

    pub async fn get_all(&self) -> Result<Vec<Assignment>, RouterError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, ticket_id, manager_id, office_id, distance_km, assignment_reason, fallback_used \
                 FROM assignments ORDER BY id",
                &[],
            )
            .await?;
        Ok(rows.iter().map(row_to_assignment).collect())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn finalize_assignment(
        &self,
        rr_key: &str,
        candidates: &[Manager],
        ticket_id: i32,
        office_id: i32,
        distance_km: Option<f64>,
        reason: String,
        fallback_used: bool,
    ) -> Result<(Assignment, i32), RouterError> {
        let mut client = self.pool.get().await?;
        let txn = client.transaction().await?;

        txn.execute(
            "INSERT INTO round_robin_state (rr_key, counter) VALUES ($1, 0) ON CONFLICT (rr_key) DO NOTHING",
            &[&rr_key],
        )
        .await?;
        let row = txn.query_one("SELECT counter FROM round_robin_state WHERE rr_key = $1 FOR UPDATE", &[&rr_key]).await?;
        let counter: i32 = row.get(0);

        let (chosen, _) = pick_next(candidates, counter as i64)?;
        let chosen_id = chosen.id;

        txn.execute(
            "UPDATE round_robin_state SET counter = $1, updated_at = now() WHERE rr_key = $2",
            &[&(counter + 1), &rr_key],
        )
        .await?;

        let row = txn
            .query_one(
                "INSERT INTO assignments (ticket_id, manager_id, office_id, distance_km, \
                 assignment_reason, fallback_used) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                &[&ticket_id, &chosen_id, &office_id, &distance_km, &reason, &fallback_used],
            )
            .await?;
        let assignment_id: i32 = row.get(0);

        txn.execute("UPDATE managers SET current_load = current_load + 1 WHERE id = $1", &[&chosen_id]).await?;

        txn.commit().await?;

        let assignment =
            Assignment { id: Some(assignment_id), ticket_id, manager_id: chosen_id, office_id, distance_km, reason, fallback_used };
        Ok((assignment, chosen_id))
    }
}

#[async_trait]
impl AssignmentRepositoryPort for PgAssignmentRepository {
    async fn save(&self, assignment: &Assignment) -> Result<Assignment, RouterError> {
        PgAssignmentRepository::save(self, assignment).await
    }

    async fn get_by_ticket(&self, ticket_id: i32) -> Result<Option<Assignment>, RouterError> {
        PgAssignmentRepository::get_by_ticket(self, ticket_id).await
    }

    async fn get_all(&self) -> Result<Vec<Assignment>, RouterError> {
        PgAssignmentRepository::get_all(self).await
    }

    async fn finalize_assignment(
        &self,
        rr_key: &str,
        candidates: &[Manager],
        ticket_id: i32,
        office_id: i32,
        distance_km: Option<f64>,
        reason: String,
        fallback_used: bool,
    ) -> Result<(Assignment, i32), RouterError> {
        PgAssignmentRepository::finalize_assignment(self, rr_key, candidates, ticket_id, office_id, distance_km, reason, fallback_used)
            .await
    }
}

fn row_to_assignment(row: &Row) -> Assignment {
    Assignment {
        id: Some(row.get(0)),
        ticket_id: row.get(1),
        manager_id: row.get(2),
        office_id: row.get(3),
        distance_km: row.get(4),
        reason: row.get::<_, Option<String>>(5).unwrap_or_default(),
        fallback_used: row.get(6),
    }
}
