//! Cache
//!
//! In-memory query cache for the remote ride and request collections.

pub mod cache_config;
pub mod query_cache;

pub use cache_config::CacheConfig;
pub use query_cache::{CacheStats, QueryCache, Tag, TagType};
