//! Join-request model
//!
//! A rider's request for a seat on a ride. The only mutation is the driver's
//! status decision, and it can only leave `pending`.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{lenient, Identity, Ride};
use crate::utils::errors::AppError;
use crate::utils::validation::parse_ride_date;

/// Request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Only `pending -> accepted` and `pending -> rejected` exist
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Accepted)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }

    pub fn transition(&self, next: RequestStatus) -> Result<RequestStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::Conflict(format!(
                "Request status cannot change from {} to {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }

    pub fn is_settled(&self) -> bool {
        *self != RequestStatus::Pending
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join-request as returned by the remote data API. Ride fields are copied
/// in so a request can be displayed without fetching its ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub ride_id: String,
    #[serde(rename = "userId", default)]
    pub requester_id: String,
    #[serde(rename = "userName", default)]
    pub requester_name: String,
    #[serde(rename = "userPhoto", default)]
    pub requester_avatar: Option<String>,
    #[serde(rename = "DriverId", default)]
    pub driver_id: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub start_location: String,
    #[serde(default)]
    pub end_location: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub price: f64,
    #[serde(default)]
    pub driver_phone: String,
}

impl RideRequest {
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        parse_ride_date(&self.date).map_or(false, |date| date < today)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_on(Local::now().date_naive())
    }

    /// Whether `uid` takes part in this request, as rider or as driver
    pub fn involves(&self, uid: &str) -> bool {
        self.requester_id == uid || self.driver_id == uid
    }

    pub fn is_for(&self, requester_id: &str, ride_id: &str) -> bool {
        self.requester_id == requester_id && self.ride_id == ride_id
    }
}

/// Payload sent to `POST /requests`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRideRequest {
    pub ride_id: String,
    #[serde(rename = "userId")]
    pub requester_id: String,
    #[serde(rename = "userName")]
    pub requester_name: String,
    #[serde(rename = "userPhoto", skip_serializing_if = "Option::is_none")]
    pub requester_avatar: Option<String>,
    #[serde(rename = "DriverId")]
    pub driver_id: String,
    pub status: RequestStatus,
    pub driver_name: String,
    pub start_location: String,
    pub end_location: String,
    pub date: String,
    pub time: String,
    pub price: f64,
    pub driver_phone: String,
}

impl NewRideRequest {
    /// New pending request from `requester` for `ride`
    pub fn for_ride(ride: &Ride, requester: &Identity) -> Self {
        Self {
            ride_id: ride.id.clone(),
            requester_id: requester.uid.clone(),
            requester_name: requester.display_name.clone().unwrap_or_default(),
            requester_avatar: requester.photo_url.clone(),
            driver_id: ride.driver_id.clone(),
            status: RequestStatus::Pending,
            driver_name: ride.driver_name.clone(),
            start_location: ride.start_location.clone(),
            end_location: ride.end_location.clone(),
            date: ride.date.clone(),
            time: ride.time.clone(),
            price: ride.price,
            driver_phone: ride.phone_number.clone(),
        }
    }
}

/// Body of `PATCH /requests/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL: [RequestStatus; 3] = [
        RequestStatus::Pending,
        RequestStatus::Accepted,
        RequestStatus::Rejected,
    ];

    #[test]
    fn test_only_pending_transitions_are_reachable() {
        for from in ALL {
            for to in ALL {
                let allowed = from == RequestStatus::Pending && to != RequestStatus::Pending;
                assert_eq!(from.can_transition_to(to), allowed, "{} -> {}", from, to);
                assert_eq!(from.transition(to).is_ok(), allowed);
            }
        }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_value(StatusUpdate { status: RequestStatus::Accepted }).unwrap(),
            json!({"status": "accepted"}));
        let parsed: RideRequest = serde_json::from_value(json!({
            "_id": "q1",
            "rideId": "r1",
            "userId": "u1",
            "DriverId": "d1",
            "status": "rejected",
            "price": "50"
        }))
        .unwrap();
        assert_eq!(parsed.status, RequestStatus::Rejected);
        assert!(parsed.involves("u1"));
        assert!(parsed.involves("d1"));
        assert!(!parsed.involves("x"));
        assert!(parsed.is_for("u1", "r1"));
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let parsed: RideRequest = serde_json::from_value(json!({"id": "q2"})).unwrap();
        assert_eq!(parsed.status, RequestStatus::Pending);
        assert!(!parsed.status.is_settled());
    }
}
