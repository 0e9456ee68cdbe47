//! Repository ports: the persistence seams the pipeline depends on.
//! Postgres implementations live alongside their respective modules;
//! tests substitute in-memory fakes so pipeline/policy behavior can be
//! verified without a database.

use async_trait::async_trait;

use crate::domain::{Analysis, Assignment, Manager, Office, Ticket};
use crate::error::RouterError;

#[async_trait]
pub trait TicketRepositoryPort: Send + Sync {
    async fn save(&self, ticket: &Ticket) -> Result<Ticket, RouterError>;
    async fn get_by_id(&self, ticket_id: i32) -> Result<Option<Ticket>, RouterError>;
    async fn get_by_guid(&self, guid: &str) -> Result<Option<Ticket>, RouterError>;
    async fn get_all(&self) -> Result<Vec<Ticket>, RouterError>;
    async fn get_unprocessed(&self) -> Result<Vec<Ticket>, RouterError>;
    async fn update(&self, ticket: &Ticket) -> Result<(), RouterError>;
}

#[async_trait]
pub trait ManagerRepositoryPort: Send + Sync {
    async fn save(&self, manager: &Manager) -> Result<Manager, RouterError>;
    async fn get_by_id(&self, manager_id: i32) -> Result<Option<Manager>, RouterError>;
    async fn get_by_office(&self, office_id: i32) -> Result<Vec<Manager>, RouterError>;
    async fn get_all(&self) -> Result<Vec<Manager>, RouterError>;
    async fn get_by_name(&self, name: &str) -> Result<Option<Manager>, RouterError>;
    async fn increment_load(&self, manager_id: i32) -> Result<(), RouterError>;
}

#[async_trait]
pub trait OfficeRepositoryPort: Send + Sync {
    async fn save(&self, office: &Office) -> Result<Office, RouterError>;
    async fn get_by_id(&self, office_id: i32) -> Result<Option<Office>, RouterError>;
    async fn get_by_name(&self, name: &str) -> Result<Option<Office>, RouterError>;
    async fn get_all(&self) -> Result<Vec<Office>, RouterError>;
    async fn update_location(&self, office_id: i32, location: crate::domain::GeoPoint) -> Result<(), RouterError>;
}

#[async_trait]
pub trait AssignmentRepositoryPort: Send + Sync {
    async fn save(&self, assignment: &Assignment) -> Result<Assignment, RouterError>;
    async fn get_by_ticket(&self, ticket_id: i32) -> Result<Option<Assignment>, RouterError>;
    async fn get_all(&self) -> Result<Vec<Assignment>, RouterError>;
    /// Advances the round-robin counter for `rr_key`, picks the manager it
    /// selects from `candidates`, inserts the assignment, and increments
    /// that manager's load, all as one atomic unit so the counter and the
    /// assignment row can never diverge.
    #[allow(clippy::too_many_arguments)]
    async fn finalize_assignment(
        &self,
        rr_key: &str,
        candidates: &[Manager],
        ticket_id: i32,
        office_id: i32,
        distance_km: Option<f64>,
        reason: String,
        fallback_used: bool,
    ) -> Result<(Assignment, i32), RouterError>;
}

#[async_trait]
pub trait AnalyticsRepositoryPort: Send + Sync {
    async fn save(&self, analysis: &Analysis) -> Result<Analysis, RouterError>;
    async fn get_by_ticket(&self, ticket_id: i32) -> Result<Option<Analysis>, RouterError>;
    async fn get_all(&self) -> Result<Vec<Analysis>, RouterError>;
}

#[async_trait]
pub trait RoundRobinRepositoryPort: Send + Sync {
    /// Current counter for `rr_key`, creating a zeroed entry if absent.
    async fn get_counter(&self, rr_key: &str) -> Result<i32, RouterError>;
    /// Atomically increments the counter, returning the value it held
    /// *before* the increment.
    async fn increment_counter(&self, rr_key: &str) -> Result<i32, RouterError>;
}
