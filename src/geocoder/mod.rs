//! Geocoder port (C7): address string in, GeoPoint out, with a layered
//! cache → API → city centroid → region centroid resolution chain.

pub mod centroids;
mod google;
mod nominatim;

pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;

use async_trait::async_trait;

use crate::domain::GeoPoint;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve an address string to a point, or `None` if every tier of
    /// the resolution chain misses.
    async fn geocode(&self, address: &str) -> Option<GeoPoint>;
}

/// Strip common street-type prefixes and numeric tokens, producing a
/// broader query variant for addresses whose exact street a provider
/// doesn't recognize (useful for rural addresses).
pub(crate) fn broadened_query(address: &str) -> Option<String> {
    let lowered = address
        .to_lowercase()
        .replace("ул.", "")
        .replace("улица", "")
        .replace("пр-т", "")
        .replace("проспект", "");

    let comma_stripped = lowered.replace(',', " ");
    let stripped: Vec<&str> =
        comma_stripped.split_whitespace().filter(|tok| !tok.chars().any(|c| c.is_ascii_digit())).collect();

    let joined = stripped.join(" ");
    let joined = joined.trim().to_string();

    if joined.is_empty() || joined == address.to_lowercase() {
        None
    } else {
        Some(joined)
    }
}
