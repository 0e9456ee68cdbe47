//! Google Geocoding API adapter, selected as the secondary provider when
//! a Google Maps API key is configured.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{centroids, Geocoder};
use crate::domain::GeoPoint;

const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    region: String,
    cache: Mutex<HashMap<String, Option<GeoPoint>>>,
}

impl GoogleGeocoder {
    pub fn new(api_key: String, region: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("reqwest client");
        Self { client, api_key, region, cache: Mutex::new(HashMap::new()) }
    }

    async fn api_lookup(&self, address: &str) -> Option<GeoPoint> {
        let result = self
            .client
            .get(GOOGLE_GEOCODE_URL)
            .query(&[
                ("address", address),
                ("key", self.api_key.as_str()),
                ("region", self.region.as_str()),
                ("language", "ru"),
            ])
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "google geocode request failed");
                return None;
            }
        };

        let body: serde_json::Value = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "google geocode returned unparseable body");
                return None;
            }
        };

        if body["status"].as_str() != Some("OK") {
            warn!(address, status = ?body["status"], "google could not resolve address");
            return None;
        }

        let loc = &body["results"][0]["geometry"]["location"];
        let (lat, lng) = (loc["lat"].as_f64(), loc["lng"].as_f64());
        if let (Some(lat), Some(lng)) = (lat, lng) {
            info!(address, lat, lng, "google resolved address");
            Some(GeoPoint::new(lat, lng))
        } else {
            None
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Option<GeoPoint> {
        let cache_key = address.trim().to_lowercase();

        if let Some(cached) = self.cache.lock().unwrap().get(&cache_key).copied() {
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
