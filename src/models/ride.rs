//! Ride model
//!
//! A driver's published offer. Rides are never edited by the main flows;
//! expiry is derived from the ride date, not stored.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::utils::validation::parse_ride_date;

/// Ride as returned by the remote data API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "DriverId", default)]
    pub driver_id: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub year: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub age: Option<u32>,
    #[serde(rename = "drivingexp", default, deserialize_with = "lenient::opt_u32")]
    pub driving_experience: Option<u32>,
    #[serde(default)]
    pub vehicle: String,
    #[serde(default)]
    pub start_location: String,
    #[serde(default)]
    pub end_location: String,
    #[serde(default)]
    pub route_description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub seats_available: u32,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub price: f64,
    #[serde(default)]
    pub phone_number: String,
}

impl Ride {
    /// A ride is expired once its date is strictly before `today`.
    /// Unparseable dates are never treated as expired.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        parse_ride_date(&self.date).map_or(false, |date| date < today)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_on(Local::now().date_naive())
    }

    /// Pre-filled message for contacting the driver
    pub fn contact_message(&self) -> String {
        format!(
            "Hello {}, I'm interested in your ride from {} to {} on {} at {}. Is it still available?",
            self.driver_name, self.start_location, self.end_location, self.date, self.time
        )
    }

    /// Direct-contact link to the driver
    pub fn contact_link(&self) -> String {
        contact_link(&self.phone_number, Some(&self.contact_message()))
    }
}

/// Build a WhatsApp deep link for a phone number
pub fn contact_link(phone: &str, message: Option<&str>) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    match message {
        Some(text) => format!("https://wa.me/{}?text={}", digits, urlencoding::encode(text)),
        None => format!("https://wa.me/{}", digits),
    }
}

/// Payload sent to `POST /publish`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    #[serde(rename = "DriverId")]
    pub driver_id: String,
    pub driver_name: String,
    pub department: String,
    pub year: u32,
    pub age: u32,
    #[serde(rename = "drivingexp")]
    pub driving_experience: u32,
    pub vehicle: String,
    pub start_location: String,
    pub end_location: String,
    pub route_description: String,
    pub date: String,
    pub time: String,
    pub seats_available: u32,
    pub price: f64,
    pub phone_number: String,
}

/// Partial update sent to `PUT /update/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats_available: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
}
