//! Postgres-backed repository adapters for the six persistence ports.

pub mod analytics;
pub mod assignments;
pub mod managers;
pub mod offices;
pub mod ports;
pub mod round_robin;
pub mod tickets;

pub use analytics::PgAnalyticsRepository;
pub use assignments::PgAssignmentRepository;
pub use managers::PgManagerRepository;
pub use offices::PgOfficeRepository;
pub use ports::{
    AnalyticsRepositoryPort, AssignmentRepositoryPort, ManagerRepositoryPort, OfficeRepositoryPort,
    RoundRobinRepositoryPort, TicketRepositoryPort,
};
pub use round_robin::PgRoundRobinRepository;
pub use tickets::PgTicketRepository;

use std::str::FromStr;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use tracing::info;

use crate::error::RouterError;

refinery::embed_migrations!("migrations");

/// Build a connection pool from a `postgres://` URL.
pub fn build_pool(database_url: &str) -> Result<Pool, RouterError> {
    let pg_config =
        tokio_postgres::Config::from_str(database_url).map_err(|e| RouterError::Config(e.to_string()))?;
    let manager_config = ManagerConfig { recycling_method: RecyclingMethod::Fast };
    let manager = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(manager).max_size(16).build().map_err(|e| RouterError::Config(e.to_string()))
}

/// Run the embedded migrations against the pool's target database.
pub async fn run_migrations(pool: &Pool) -> Result<(), RouterError> {
    let mut client = pool.get().await?;
    let report = migrations::runner().run_async(&mut **client).await?;
    info!(applied = report.applied_migrations().len(), "ran database migrations");
    Ok(())
}
