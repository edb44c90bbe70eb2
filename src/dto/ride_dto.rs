use serde::Deserialize;
use validator::Validate;

use crate::models::RequestStatus;
use crate::utils::validation::{validate_date, validate_not_empty, validate_time, PHONE_RE};

// Publish form as submitted by the view
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishRideForm {
    #[validate(custom = "validate_not_empty")]
    pub driver_name: String,

    #[validate(custom = "validate_not_empty")]
    pub department: String,

    #[validate(range(min = 1, max = 4))]
    pub year: u32,

    #[validate(range(min = 18))]
    pub age: u32,

    pub experience: u32,

    #[validate(custom = "validate_not_empty")]
    pub start_location: String,

    #[validate(custom = "validate_not_empty")]
    pub end_location: String,

    #[validate(custom = "validate_date")]
    pub date: String,

    #[validate(custom = "validate_time")]
    pub time: String,

    #[validate(custom = "validate_not_empty")]
    pub car_model: String,

    #[validate(range(min = 1))]
    pub seats_available: u32,

    #[validate(regex = "PHONE_RE")]
    pub phone: String,
}

// Route preview requested while the publish form is being filled in
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoutePreviewForm {
    #[validate(custom = "validate_not_empty")]
    pub start_location: String,

    #[validate(custom = "validate_not_empty")]
    pub end_location: String,

    pub seats_available: Option<u32>,
}

// Search criteria (`/search?start=..&end=..`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

// Join request for one ride
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRideForm {
    #[validate(custom = "validate_not_empty")]
    pub ride_id: String,
}

// Driver decision on a request
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusForm {
    pub status: RequestStatus,
}
