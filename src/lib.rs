//! Campus carpool client
//!
//! One process is one client instance: it signs a single user in through the
//! identity provider, reads and writes rides and join-requests through the
//! remote data API behind a tag-invalidated cache, composes routes and fares
//! through the mapping services, and serves the resulting pages as JSON.

pub mod cache;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;
