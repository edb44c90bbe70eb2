//! Ride endpoints over the query cache
//!
//! The ride list provides the bare `Rides` tag, each ride detail provides
//! `{Rides, id}`. Mutations invalidate the tags they affect; the next read
//! refetches.

use std::sync::Arc;

use crate::cache::{CacheConfig, CacheStats, QueryCache, Tag, TagType};
use crate::clients::RideDataSource;
use crate::models::{NewRide, Ride, RideUpdate};
use crate::utils::errors::AppResult;

const RIDES_KEY: &str = "rides";

fn ride_key(id: &str) -> String {
    format!("rides/{}", id)
}

pub struct RidesApi {
    source: Arc<dyn RideDataSource>,
    lists: QueryCache<Vec<Ride>>,
    details: QueryCache<Ride>,
}

impl RidesApi {
    pub fn new(source: Arc<dyn RideDataSource>, config: CacheConfig) -> Self {
        Self {
            source,
            lists: QueryCache::new(config),
            details: QueryCache::new(config),
        }
    }

    pub async fn fetch_all_rides(&self) -> AppResult<Vec<Ride>> {
        self.lists
            .query(RIDES_KEY, vec![Tag::collection(TagType::Rides)], || {
                self.source.list_rides()
            })
            .await
    }

    pub async fn fetch_ride_by_id(&self, id: &str) -> AppResult<Ride> {
        self.details
            .query(&ride_key(id), vec![Tag::item(TagType::Rides, id)], || {
                self.source.get_ride(id)
            })
            .await
    }

    pub async fn add_ride(&self, ride: &NewRide) -> AppResult<Ride> {
        let published = self.source.publish_ride(ride).await?;
        self.invalidate(&[Tag::collection(TagType::Rides)]).await;
        Ok(published)
    }

    pub async fn update_ride(&self, id: &str, patch: &RideUpdate) -> AppResult<()> {
        self.source.update_ride(id, patch).await?;
        self.invalidate(&[Tag::item(TagType::Rides, id), Tag::collection(TagType::Rides)])
            .await;
        Ok(())
    }

    pub async fn delete_ride(&self, id: &str) -> AppResult<()> {
        self.source.delete_ride(id).await?;
        self.invalidate(&[Tag::collection(TagType::Rides)]).await;
        Ok(())
    }

    pub async fn invalidate(&self, tags: &[Tag]) -> usize {
        self.lists.invalidate(tags).await + self.details.invalidate(tags).await
    }

    /// Cache statistics for the list and detail queries
    pub async fn stats(&self) -> (CacheStats, CacheStats) {
        (self.lists.stats().await, self.details.stats().await)
    }
}
