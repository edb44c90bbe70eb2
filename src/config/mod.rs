//! Project configuration
//!
//! Environment variables and service endpoints.

pub mod environment;

pub use environment::*;
