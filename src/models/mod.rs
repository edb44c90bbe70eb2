//! Domain models
//!
//! Rides and join-requests as served by the remote data API, the signed-in
//! identity projection, and derived route/fare values.

pub mod identity;
pub mod ride;
pub mod ride_request;
pub mod route;

pub use identity::*;
pub use ride::*;
pub use ride_request::*;
pub use route::*;

/// Lenient numeric decoding. Records published by older clients carry some
/// numbers as strings (`"age": "21"`, `"price": "64.41"`).
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    fn to_f64(raw: Option<NumberOrString>) -> Option<f64> {
        match raw? {
            NumberOrString::Number(n) => Some(n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn f64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(to_f64(Option::deserialize(d)?).unwrap_or(0.0))
    }

    pub fn u32_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(opt_from(to_f64(Option::deserialize(d)?)).unwrap_or(0))
    }

    pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(opt_from(to_f64(Option::deserialize(d)?)))
    }

    fn opt_from(value: Option<f64>) -> Option<u32> {
        value.filter(|v| *v >= 0.0).map(|v| v as u32)
    }
}
