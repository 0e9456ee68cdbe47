//! Assignment entity — the result of routing a ticket to a manager.

#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: Option<i32>,
    pub ticket_id: i32,
    pub manager_id: i32,
    pub office_id: i32,
    pub distance_km: Option<f64>,
    pub reason: String,
    pub fallback_used: bool,
}
