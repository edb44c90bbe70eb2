//! Shared utilities
//!
//! Error handling, form validation and identity token helpers.

pub mod errors;
pub mod jwt;
pub mod validation;
