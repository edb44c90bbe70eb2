//! Data transfer objects
//!
//! Forms accepted by the views, view models returned by them, and the wire
//! formats of the external identity and mapping services.

pub mod auth_dto;
pub mod identity_dto;
pub mod mapping_dto;
pub mod ride_dto;
pub mod view_dto;
