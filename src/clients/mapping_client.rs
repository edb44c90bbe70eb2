//! Geocoding and routing
//!
//! Place names are resolved through Nominatim and driving routes through
//! OSRM. Both are public services; the client identifies itself with a
//! User-Agent as their usage policies require.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::dto::mapping_dto::{NominatimPlace, OsrmRouteResponse};
use crate::models::{Coordinates, RouteInfo};
use crate::utils::errors::{AppError, MappingError};

const USER_AGENT: &str = "CampusCarpool/1.0";

#[async_trait]
pub trait MappingService: Send + Sync {
    /// Best match for a free-text place, `None` when nothing matches
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, MappingError>;

    /// Driving route through the given waypoints
    async fn route(&self, waypoints: &[Coordinates]) -> Result<RouteInfo, MappingError>;
}

pub struct OsmMappingClient {
    client: Client,
    geocoding_base_url: String,
    routing_base_url: String,
}

impl OsmMappingClient {
    pub fn new(
        geocoding_base_url: String,
        routing_base_url: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create mapping HTTP client: {}", e)))?;

        Ok(Self {
            client,
            geocoding_base_url,
            routing_base_url,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, MappingError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MappingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Mapping request failed with status {}: {}", status, body);
            return Err(MappingError::Request(format!("status {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| MappingError::Request(e.to_string()))
    }
}

#[async_trait]
impl MappingService for OsmMappingClient {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, MappingError> {
        log::info!("🗺️ Geocoding place: {}", place);

        let url = format!(
            "{}/search?format=json&limit=1&q={}",
            self.geocoding_base_url,
            urlencoding::encode(place)
        );
        let body = self.get_text(&url).await?;

        let places: Vec<NominatimPlace> = serde_json::from_str(&body)
            .map_err(|e| MappingError::Request(format!("Failed to parse geocoding response: {}", e)))?;

        let Some(first) = places.first() else {
            log::warn!("⚠️ No geocoding match for: {}", place);
            return Ok(None);
        };

        match (first.lat.parse::<f64>(), first.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => {
                log::info!("✅ Geocoded {} -> ({}, {})", place, lat, lon);
                Ok(Some(Coordinates { lat, lon }))
            }
            _ => Err(MappingError::Request(format!(
                "Invalid coordinates for '{}': {}, {}",
                place, first.lat, first.lon
            ))),
        }
    }

    async fn route(&self, waypoints: &[Coordinates]) -> Result<RouteInfo, MappingError> {
        if waypoints.len() < 2 {
            return Err(MappingError::NoRoute);
        }

        let path = waypoints
            .iter()
            .map(|c| format!("{},{}", c.lon, c.lat))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!(
            "{}/route/v1/driving/{}?overview=full&geometries=geojson",
            self.routing_base_url, path
        );

        log::info!("🧭 Requesting route for {} waypoints", waypoints.len());
        let body = self.get_text(&url).await?;

        let parsed: OsrmRouteResponse = serde_json::from_str(&body)
            .map_err(|e| MappingError::Request(format!("Failed to parse routing response: {}", e)))?;

        if parsed.code != "Ok" {
            log::warn!(
                "⚠️ Routing returned {}: {}",
                parsed.code,
                parsed.message.as_deref().unwrap_or("")
            );
            return Err(MappingError::NoRoute);
        }

        let route = parsed.routes.into_iter().next().ok_or(MappingError::NoRoute)?;
        let name = route
            .legs
            .iter()
            .map(|leg| leg.summary.trim())
            .find(|summary| !summary.is_empty())
            .map(str::to_string);

        Ok(RouteInfo {
            coordinates: route
                .geometry
                .coordinates
                .iter()
                .map(|[lon, lat]| Coordinates { lat: *lat, lon: *lon })
                .collect(),
            distance_m: route.distance,
            duration_s: route.duration,
            name,
        })
    }
}
