//! Office entity — a business unit with a physical location.

use super::geo_point::GeoPoint;

#[derive(Debug, Clone)]
pub struct Office {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub location: Option<GeoPoint>,
}

impl Office {
    /// An office with no known location cannot host `select_nearest` but
    /// remains eligible for the hub fallback.
    pub fn needs_geocode(&self) -> bool {
        self.location.is_none()
    }
}
