//! Crate-wide error taxonomy.
//!
//! Transient external failures (classifier/geocoder HTTP) and
//! classification ambiguity never reach here — they are absorbed into
//! degraded output inside the classifier/geocoder adapters. Only the
//! structural categories from the routing design surface as `Result::Err`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("database error: {0}")]
    Db(#[from] tokio_postgres::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),

    #[error("no offices with known locations available")]
    NoCandidates,

    #[error("no offices available for fallback")]
    NoOffices,

    #[error("hub offices not found and sorted fallback is not enabled")]
    HubOfficesNotFound,

    #[error("no eligible managers found")]
    NoEligibleManagers,

    #[error("configuration error: {0}")]
    Config(String),
}
