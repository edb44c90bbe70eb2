//! Validation helpers
//!
//! Field checks shared by the publish and auth forms.

use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Ten-digit contact phone number
    pub static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

/// Parse a ride date (`YYYY-MM-DD`, optionally followed by a time part)
pub fn parse_ride_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Validate a ride date
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    parse_ride_date(value).map(|_| ()).ok_or_else(|| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validate a departure time (`HH:MM`, seconds optional)
pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map(|_| ())
        .map_err(|_| {
            let mut error = ValidationError::new("time");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"HH:MM".to_string());
            error
        })
}

/// Validate that a string is not blank
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Normalize a free-text place name for geocoding and comparisons
pub fn normalize_place(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive comparison key for a place name
pub fn place_key(value: &str) -> String {
    normalize_place(value).to_lowercase()
}
