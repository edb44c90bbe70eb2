//! Clients for the external collaborators
//!
//! Each collaborator sits behind a trait so the services can run against
//! in-memory fakes.

pub mod data_api_client;
pub mod identity_client;
pub mod mapping_client;

pub use data_api_client::{DataApiClient, RideDataSource};
pub use identity_client::{AuthStateEvent, IdentityProvider, IdentityToolkitClient, ProviderCredential};
pub use mapping_client::{MappingService, OsmMappingClient};
