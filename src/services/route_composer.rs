//! Route composition for the publish flow
//!
//! Geocodes both place names, routes between them and derives the route
//! description and fare. One draft route is kept per client instance; it
//! is replaced when a location changes and dropped on publish or logout.

use futures::future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::MappingService;
use crate::dto::view_dto::RoutePreview;
use crate::models::{Coordinates, FareCalculator};
use crate::utils::errors::{bad_request_error, AppResult, MappingError};
use crate::utils::validation::{normalize_place, place_key};

pub struct RouteComposer {
    mapping: Arc<dyn MappingService>,
    fare: FareCalculator,
    draft: RwLock<Option<RoutePreview>>,
}

impl RouteComposer {
    pub fn new(mapping: Arc<dyn MappingService>, fare: FareCalculator) -> Self {
        Self {
            mapping,
            fare,
            draft: RwLock::new(None),
        }
    }

    /// Route and fare for one (start, end) pair
    pub async fn compose(&self, start: &str, end: &str, seats: Option<u32>) -> AppResult<RoutePreview> {
        let start = normalize_place(start);
        let end = normalize_place(end);
        if start.is_empty() || end.is_empty() {
            return Err(bad_request_error("Both start and end locations are required"));
        }

        let (from, to) = future::join(self.locate(&start), self.locate(&end)).await;
        let (from, to) = (from?, to?);

        let route = self.mapping.route(&[from, to]).await?;
        if !(route.distance_m > 0.0) {
            log::warn!("⚠️ Rejected route {} -> {} with distance {}", start, end, route.distance_m);
            return Err(MappingError::InvalidDistance(route.distance_m).into());
        }

        let description = route.describe(&start, &end);
        let fare = self.fare.estimate(route.distance_km(), seats);
        log::info!(
            "🧭 Route {} -> {}: {:.1} km, {:.2} per seat",
            start,
            end,
            fare.distance_km,
            fare.per_seat_fare
        );

        Ok(RoutePreview {
            start_location: start,
            end_location: end,
            price: fare.published_price(),
            route,
            description,
            fare,
        })
    }

    async fn locate(&self, place: &str) -> Result<Coordinates, MappingError> {
        self.mapping
            .geocode(place)
            .await?
            .ok_or_else(|| MappingError::NoMatch(place.to_string()))
    }

    /// Compose a route and keep it as the draft. An existing draft for the
    /// same locations is reused with the fare re-split for `seats`.
    pub async fn preview(&self, start: &str, end: &str, seats: Option<u32>) -> AppResult<RoutePreview> {
        if let Some(existing) = self.draft_for(start, end).await {
            let preview = self.with_seats(existing, seats);
            *self.draft.write().await = Some(preview.clone());
            return Ok(preview);
        }

        // A failed compose also discards the previous draft.
        *self.draft.write().await = None;
        let preview = self.compose(start, end, seats).await?;
        *self.draft.write().await = Some(preview.clone());
        Ok(preview)
    }

    pub async fn draft(&self) -> Option<RoutePreview> {
        self.draft.read().await.clone()
    }

    /// Draft route when it was composed for these locations
    pub async fn draft_for(&self, start: &str, end: &str) -> Option<RoutePreview> {
        self.draft.read().await.as_ref().and_then(|draft| {
            let same = place_key(&draft.start_location) == place_key(start)
                && place_key(&draft.end_location) == place_key(end);
            same.then(|| draft.clone())
        })
    }

    /// Route for publishing: the matching draft, else a fresh composition
    pub async fn route_for_publish(&self, start: &str, end: &str, seats: u32) -> AppResult<RoutePreview> {
        match self.draft_for(start, end).await {
            Some(draft) => Ok(self.with_seats(draft, Some(seats))),
            None => self.compose(start, end, Some(seats)).await,
        }
    }

    pub async fn clear_draft(&self) {
        if self.draft.write().await.take().is_some() {
            log::debug!("Draft route discarded");
        }
    }

    fn with_seats(&self, preview: RoutePreview, seats: Option<u32>) -> RoutePreview {
        let fare = self.fare.estimate(preview.route.distance_km(), seats);
        RoutePreview {
            price: fare.published_price(),
            fare,
            ..preview
        }
    }
}
