//! Routers
//!
//! Public pages (home, login, register) are mounted as-is; search, publish
//! and requests sit behind the session guard.

pub mod auth_routes;
pub mod home_routes;
pub mod publish_routes;
pub mod requests_routes;
pub mod search_routes;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::{cors_layer, require_session};
use crate::state::AppState;

pub fn create_app_router(state: AppState) -> Router {
    let guarded = Router::new()
        .merge(search_routes::create_search_router())
        .merge(publish_routes::create_publish_router())
        .merge(requests_routes::create_requests_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(home_routes::create_home_router())
        .merge(auth_routes::create_auth_router())
        .merge(guarded)
        .fallback(home_routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
