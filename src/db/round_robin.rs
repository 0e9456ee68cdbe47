//! Round-robin counter repository — the only table in the schema that
//! requires row-level locking, since concurrent ticket pipelines race to
//! pick the next manager for the same selection key.

use async_trait::async_trait;
use deadpool_postgres::Pool;

use super::ports::RoundRobinRepositoryPort;
use crate::error::RouterError;

pub struct PgRoundRobinRepository {
    pool: Pool,
}

impl PgRoundRobinRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Current counter value for `rr_key`, creating a zeroed row if absent.
    pub async fn get_counter(&self, rr_key: &str) -> Result<i32, RouterError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO round_robin_state (rr_key, counter) VALUES ($1, 0) ON CONFLICT (rr_key) DO NOTHING",
                &[&rr_key],
            )
            .await?;
        let row = client.query_one("SELECT counter FROM round_robin_state WHERE rr_key = $1", &[&rr_key]).await?;
        Ok(row.get(0))
    }

    /// Atomically increments the counter under `SELECT ... FOR UPDATE` and
    /// returns the value it held *before* the increment.
    pub async fn increment_counter(&self, rr_key: &str) -> Result<i32, RouterError> {
        let mut client = self.pool.get().await?;
        let txn = client.transaction().await?;

        txn.execute(
            "INSERT INTO round_robin_state (rr_key, counter) VALUES ($1, 0) ON CONFLICT (rr_key) DO NOTHING",
            &[&rr_key],
        )
        .await?;

        let row = txn
            .query_one("SELECT counter FROM round_robin_state WHERE rr_key = $1 FOR UPDATE", &[&rr_key])
            .await?;
        let old_value: i32 = row.get(0);

        txn.execute(
            "UPDATE round_robin_state SET counter = $1, updated_at = now() WHERE rr_key = $2",
            &[&(old_value + 1), &rr_key],
        )
        .await?;

        txn.commit().await?;
        Ok(old_value)
    }
}

#[async_trait]
impl RoundRobinRepositoryPort for PgRoundRobinRepository {
    async fn get_counter(&self, rr_key: &str) -> Result<i32, RouterError> {
        PgRoundRobinRepository::get_counter(self, rr_key).await
    }

    async fn increment_counter(&self, rr_key: &str) -> Result<i32, RouterError> {
        PgRoundRobinRepository::increment_counter(self, rr_key).await
    }
}
