//! Services module
//!
//! Application logic on top of the collaborator clients: cached ride and
//! request endpoints, the session store, route composition, search and the
//! request change feed.

pub mod request_feed;
pub mod requests_api;
pub mod ride_search;
pub mod rides_api;
pub mod route_composer;
pub mod session_store;

#[cfg(test)]
pub(crate) mod fakes;

pub use request_feed::{RequestChange, RequestFeed};
pub use requests_api::{JoinOutcome, RequestsApi};
pub use ride_search::RideSearch;
pub use rides_api::RidesApi;
pub use route_composer::RouteComposer;
pub use session_store::SessionStore;
