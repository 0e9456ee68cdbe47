//! Nominatim (OpenStreetMap) geocoder adapter: the primary provider.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{broadened_query, centroids, Geocoder};
use crate::domain::GeoPoint;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

pub struct NominatimGeocoder {
    client: reqwest::Client,
    user_agent: String,
    country_code: String,
    cache: Mutex<HashMap<String, Option<GeoPoint>>>,
}

impl NominatimGeocoder {
    pub fn new(user_agent: String, country_code: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("reqwest client");
        Self { client, user_agent, country_code, cache: Mutex::new(HashMap::new()) }
    }

    async fn api_lookup(&self, address: &str) -> Option<GeoPoint> {
        let mut queries = vec![address.to_string()];
        if let Some(broadened) = broadened_query(address) {
            queries.push(broadened);
        }

        for query in &queries {
            let result = self
                .client
                .get(NOMINATIM_URL)
                .query(&[
                    ("q", query.as_str()),
                    ("format", "json"),
                    ("limit", "1"),
                    ("countrycodes", self.country_code.as_str()),
                ])
                .header("User-Agent", &self.user_agent)
                .send()
                .await;

            let response = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "nominatim request failed");
                    continue;
                }
            };

            let body: serde_json::Value = match response.json().await {
                Ok(b) => b,
                Err(e) => {
                    warn!(error = %e, "nominatim returned unparseable body");
                    continue;
                }
            };

            if let Some(first) = body.as_array().and_then(|a| a.first()) {
                let lat = first["lat"].as_str().and_then(|s| s.parse::<f64>().ok());
                let lon = first["lon"].as_str().and_then(|s| s.parse::<f64>().ok());
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    info!(address, query, lat, lon, "nominatim resolved address");
                    return Some(GeoPoint::new(lat, lon));
                }
            }
        }

        None
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Option<GeoPoint> {
        let cache_key = address.trim().to_lowercase();

        if let Some(cached) = self.cache.lock().unwrap().get(&cache_key).copied() {
            debug!(address, "geocoder cache hit");
            return cached;
        }

        let resolved = match self.api_lookup(address).await {
            Some(p) => Some(p),
            None => centroids::lookup_city(&cache_key).or_else(|| centroids::lookup_region(&cache_key)),
        };

        self.cache.lock().unwrap().insert(cache_key, resolved);
        resolved
    }
}
