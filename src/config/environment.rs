//! Environment configuration
//!
//! Typed settings read from the process environment (after `.env` has been
//! loaded by the binary). Every value has a default except the identity
//! API key, which stays empty when unset.

use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::utils::errors::AppError;

const FEED_INTERVAL_RANGE_SECS: RangeInclusive<u64> = 1..=10;

/// Client configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    /// Remote Data Service base URL
    pub data_api_base_url: String,
    /// Identity Toolkit base URL
    pub identity_base_url: String,
    pub identity_api_key: String,
    /// Nominatim-compatible geocoding endpoint
    pub geocoding_base_url: String,
    /// OSRM-compatible routing endpoint
    pub routing_base_url: String,
    pub http_timeout_secs: u64,
    pub fuel_efficiency_km_per_liter: f64,
    pub fuel_price_per_liter: f64,
    pub request_feed_interval_secs: u64,
    pub cache: CacheConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            data_api_base_url: "http://localhost:5000".to_string(),
            identity_base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            identity_api_key: String::new(),
            geocoding_base_url: "https://nominatim.openstreetmap.org".to_string(),
            routing_base_url: "https://router.project-osrm.org".to_string(),
            http_timeout_secs: 10,
            fuel_efficiency_km_per_liter: 15.0,
            fuel_price_per_liter: 96.62,
            request_feed_interval_secs: 5,
            cache: CacheConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            environment: load_or("ENVIRONMENT", defaults.environment)?,
            port: load_or("PORT", defaults.port)?,
            host: load_or("HOST", defaults.host)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            data_api_base_url: trim_url(load_or("DATA_API_BASE_URL", defaults.data_api_base_url)?),
            identity_base_url: trim_url(load_or("IDENTITY_BASE_URL", defaults.identity_base_url)?),
            identity_api_key: env::var("IDENTITY_API_KEY").unwrap_or_default(),
            geocoding_base_url: trim_url(load_or("GEOCODING_BASE_URL", defaults.geocoding_base_url)?),
            routing_base_url: trim_url(load_or("ROUTING_BASE_URL", defaults.routing_base_url)?),
            http_timeout_secs: load_or("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            fuel_efficiency_km_per_liter: load_or(
                "FUEL_EFFICIENCY_KM_PER_LITER",
                defaults.fuel_efficiency_km_per_liter,
            )?,
            fuel_price_per_liter: load_or("FUEL_PRICE_PER_LITER", defaults.fuel_price_per_liter)?,
            request_feed_interval_secs: load_or(
                "REQUEST_FEED_INTERVAL_SECS",
                defaults.request_feed_interval_secs,
            )?,
            cache: CacheConfig {
                stale_after_secs: load_or("CACHE_STALE_AFTER_SECS", defaults.cache.stale_after_secs)?,
                max_entries: load_or("CACHE_MAX_ENTRIES", defaults.cache.max_entries)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.fuel_efficiency_km_per_liter <= 0.0 {
            return Err(AppError::Config(
                "FUEL_EFFICIENCY_KM_PER_LITER must be positive".to_string(),
            ));
        }
        if self.fuel_price_per_liter < 0.0 {
            return Err(AppError::Config(
                "FUEL_PRICE_PER_LITER must not be negative".to_string(),
            ));
        }
        if !FEED_INTERVAL_RANGE_SECS.contains(&self.request_feed_interval_secs) {
            log::warn!(
                "⚠️ REQUEST_FEED_INTERVAL_SECS={} is outside {:?}, using {:?}",
                self.request_feed_interval_secs,
                FEED_INTERVAL_RANGE_SECS,
                self.request_feed_interval()
            );
        }
        Ok(())
    }

    /// Whether we are in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Server bind address
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Feed refresh period, clamped to 1–10 s
    pub fn request_feed_interval(&self) -> Duration {
        Duration::from_secs(self.request_feed_interval_secs.clamp(
            *FEED_INTERVAL_RANGE_SECS.start(),
            *FEED_INTERVAL_RANGE_SECS.end(),
        ))
    }
}

fn load_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", key, raw, e))),
        Err(_) => {
            log::debug!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_fare_constants() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.fuel_efficiency_km_per_liter, 15.0);
        assert_eq!(config.fuel_price_per_liter, 96.62);
        assert_eq!(config.request_feed_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_feed_interval_is_clamped() {
        let slow = EnvironmentConfig {
            request_feed_interval_secs: 30,
            ..EnvironmentConfig::default()
        };
        assert!(slow.validate().is_ok());
        assert_eq!(slow.request_feed_interval(), Duration::from_secs(10));

        let zero = EnvironmentConfig {
            request_feed_interval_secs: 0,
            ..EnvironmentConfig::default()
        };
        assert_eq!(zero.request_feed_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("http://api.local/".to_string()), "http://api.local");
    }
}
