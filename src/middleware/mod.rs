//! HTTP middleware: session guard, CORS and the JSON body extractor

pub mod cors;
pub mod json_body;
pub mod session_guard;

pub use cors::cors_layer;
pub use json_body::JsonBody;
pub use session_guard::require_session;
