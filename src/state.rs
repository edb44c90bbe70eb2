//! Shared application state
//!
//! Built once at startup in dependency order: collaborators first, then the
//! session store, the cached endpoints, the route composer and finally the
//! request feed that reads from both the session and the request cache.

use std::sync::Arc;

use crate::clients::{
    DataApiClient, IdentityProvider, IdentityToolkitClient, MappingService, OsmMappingClient,
    RideDataSource,
};
use crate::config::environment::EnvironmentConfig;
use crate::models::FareCalculator;
use crate::services::{RequestFeed, RequestsApi, RidesApi, RouteComposer, SessionStore};
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub session: Arc<SessionStore>,
    pub rides: Arc<RidesApi>,
    pub requests: Arc<RequestsApi>,
    pub composer: Arc<RouteComposer>,
    pub feed: Arc<RequestFeed>,
}

impl AppState {
    /// Wire the state around already-built collaborators. Background tasks
    /// are not started; see [`AppState::start`].
    pub fn new(
        config: EnvironmentConfig,
        data: Arc<dyn RideDataSource>,
        identity: Arc<dyn IdentityProvider>,
        mapping: Arc<dyn MappingService>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(identity));
        let rides = Arc::new(RidesApi::new(data.clone(), config.cache));
        let requests = Arc::new(RequestsApi::new(data, config.cache));
        let composer = Arc::new(RouteComposer::new(
            mapping,
            FareCalculator::new(config.fuel_efficiency_km_per_liter, config.fuel_price_per_liter),
        ));
        let feed = Arc::new(RequestFeed::new(
            requests.clone(),
            session.clone(),
            config.request_feed_interval(),
        ));

        Self {
            config: Arc::new(config),
            session,
            rides,
            requests,
            composer,
            feed,
        }
    }

    /// State backed by the real HTTP collaborators
    pub fn from_config(config: EnvironmentConfig) -> AppResult<Self> {
        let timeout = config.http_timeout();

        let data = DataApiClient::new(config.data_api_base_url.clone(), timeout)?;
        let identity = IdentityToolkitClient::new(
            config.identity_base_url.clone(),
            config.identity_api_key.clone(),
            format!("http://localhost:{}", config.port),
            timeout,
        )?;
        let mapping = OsmMappingClient::new(
            config.geocoding_base_url.clone(),
            config.routing_base_url.clone(),
            timeout,
        )?;

        Ok(Self::new(
            config,
            Arc::new(data),
            Arc::new(identity),
            Arc::new(mapping),
        ))
    }

    /// Subscribe the session store, then start the request feed
    pub async fn start(&self) {
        self.session.start().await;
        self.feed.start().await;
    }

    pub async fn shutdown(&self) {
        self.feed.shutdown().await;
        self.session.shutdown().await;

        let (ride_lists, ride_details) = self.rides.stats().await;
        let (request_lists, request_details) = self.requests.stats().await;
        log::info!("📊 Ride cache: lists {:?}, details {:?}", ride_lists, ride_details);
        log::info!("📊 Request cache: lists {:?}, details {:?}", request_lists, request_details);
    }
}
