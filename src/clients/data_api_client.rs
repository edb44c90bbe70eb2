//! Remote ride/request data API
//!
//! The data service owns every ride and join-request. Reads surface as
//! `DataService` errors, writes as `Mutation` errors, so callers can tell
//! a failed page load from a failed submit.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::models::{
    NewRide, NewRideRequest, RequestStatus, Ride, RideRequest, RideUpdate, StatusUpdate,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[async_trait]
pub trait RideDataSource: Send + Sync {
    async fn list_rides(&self) -> AppResult<Vec<Ride>>;
    async fn get_ride(&self, id: &str) -> AppResult<Ride>;
    async fn publish_ride(&self, ride: &NewRide) -> AppResult<Ride>;
    async fn update_ride(&self, id: &str, update: &RideUpdate) -> AppResult<()>;
    async fn delete_ride(&self, id: &str) -> AppResult<()>;

    async fn list_requests(&self) -> AppResult<Vec<RideRequest>>;
    async fn get_request(&self, id: &str) -> AppResult<RideRequest>;
    async fn create_request(&self, request: &NewRideRequest) -> AppResult<RideRequest>;
    async fn update_request_status(&self, id: &str, status: RequestStatus) -> AppResult<()>;
}

/// HTTP client for the data API
pub struct DataApiClient {
    client: Client,
    base_url: String,
}

#[derive(Clone, Copy)]
enum CallKind {
    Read,
    Write,
}

impl CallKind {
    fn error(self, message: String) -> AppError {
        match self {
            CallKind::Read => AppError::DataService(message),
            CallKind::Write => AppError::Mutation(message),
        }
    }
}

impl DataApiClient {
    pub fn new(base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create data API client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<B: Serialize + ?Sized + Sync>(
        &self,
        kind: CallKind,
        method: Method,
        path: &str,
        body: Option<&B>,
        resource: (&str, &str),
    ) -> AppResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("🌐 {} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| kind.error(format!("{} {} failed: {}", method, path, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND && !resource.1.is_empty() {
            return Err(not_found_error(resource.0, resource.1));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::error!("❌ {} {} returned {}: {}", method, path, status, text);
            return Err(kind.error(format!("{} {} returned {}", method, path, status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| kind.error(format!("Failed to read response body: {}", e)))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| kind.error(format!("Invalid JSON from {} {}: {}", method, path, e)))
    }
}

/// Extract a record from either a bare document or a `{data|ride|request: ..}` envelope
fn decode_record<T: DeserializeOwned>(value: &Value, envelope: &str) -> Option<T> {
    [envelope, "data"]
        .iter()
        .filter_map(|key| value.get(key))
        .chain(std::iter::once(value))
        .find_map(|candidate| serde_json::from_value(candidate.clone()).ok())
}

fn decode_list<T: DeserializeOwned>(value: Value, envelope: &str) -> AppResult<Vec<T>> {
    let list = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove(envelope)
            .or_else(|| map.remove("data"))
            .unwrap_or(Value::Array(Vec::new())),
        Value::Null => Value::Array(Vec::new()),
        other => {
            return Err(AppError::DataService(format!(
                "Expected a list of {}, got {}",
                envelope, other
            )))
        }
    };

    let Value::Array(items) = list else {
        return Err(AppError::DataService(format!(
            "Expected a list of {}, got {}",
            envelope, list
        )));
    };

    // One bad record must not hide the rest of the list.
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("⚠️ Skipping undecodable {} record #{}: {}", envelope, index, e);
                None
            }
        })
        .collect())
}

/// Id assigned by the server when the write response is not a full document
fn inserted_id(value: &Value) -> String {
    ["_id", "id", "insertedId"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl RideDataSource for DataApiClient {
    async fn list_rides(&self) -> AppResult<Vec<Ride>> {
        let value = self
            .call::<()>(CallKind::Read, Method::GET, "/search", None, ("Ride", ""))
            .await?;
        let rides = decode_list(value, "rides")?;
        log::info!("🚗 Loaded {} rides", rides.len());
        Ok(rides)
    }

    async fn get_ride(&self, id: &str) -> AppResult<Ride> {
        let path = format!("/search/{}", urlencoding::encode(id));
        let value = self
            .call::<()>(CallKind::Read, Method::GET, &path, None, ("Ride", id))
            .await?;
        decode_record(&value, "ride")
            .ok_or_else(|| AppError::DataService(format!("Malformed ride document '{}'", id)))
    }

    async fn publish_ride(&self, ride: &NewRide) -> AppResult<Ride> {
        let value = self
            .call(CallKind::Write, Method::POST, "/publish", Some(ride), ("Ride", ""))
            .await?;

        let published = decode_record::<Ride>(&value, "ride")
            .filter(|r| !r.id.is_empty() && !r.driver_id.is_empty())
            .unwrap_or_else(|| Ride {
                id: inserted_id(&value),
                driver_id: ride.driver_id.clone(),
                driver_name: ride.driver_name.clone(),
                department: ride.department.clone(),
                year: Some(ride.year),
                age: Some(ride.age),
                driving_experience: Some(ride.driving_experience),
                vehicle: ride.vehicle.clone(),
                start_location: ride.start_location.clone(),
                end_location: ride.end_location.clone(),
                route_description: ride.route_description.clone(),
                date: ride.date.clone(),
                time: ride.time.clone(),
                seats_available: ride.seats_available,
                price: ride.price,
                phone_number: ride.phone_number.clone(),
            });

        log::info!("✅ Ride published: {}", published.id);
        Ok(published)
    }

    async fn update_ride(&self, id: &str, update: &RideUpdate) -> AppResult<()> {
        let path = format!("/update/{}", urlencoding::encode(id));
        self.call(CallKind::Write, Method::PUT, &path, Some(update), ("Ride", id))
            .await?;
        log::info!("✅ Ride updated: {}", id);
        Ok(())
    }

    async fn delete_ride(&self, id: &str) -> AppResult<()> {
        let path = format!("/delete/{}", urlencoding::encode(id));
        self.call::<()>(CallKind::Write, Method::DELETE, &path, None, ("Ride", id))
            .await?;
        log::info!("🗑️ Ride deleted: {}", id);
        Ok(())
    }

    async fn list_requests(&self) -> AppResult<Vec<RideRequest>> {
        let value = self
            .call::<()>(CallKind::Read, Method::GET, "/requests", None, ("Request", ""))
            .await?;
        decode_list(value, "requests")
    }

    async fn get_request(&self, id: &str) -> AppResult<RideRequest> {
        let path = format!("/requests/{}", urlencoding::encode(id));
        let value = self
            .call::<()>(CallKind::Read, Method::GET, &path, None, ("Request", id))
            .await?;
        decode_record(&value, "request")
            .ok_or_else(|| AppError::DataService(format!("Malformed request document '{}'", id)))
    }

    async fn create_request(&self, request: &NewRideRequest) -> AppResult<RideRequest> {
        let value = self
            .call(CallKind::Write, Method::POST, "/requests", Some(request), ("Request", ""))
            .await?;

        let created = decode_record::<RideRequest>(&value, "request")
            .filter(|r| !r.id.is_empty() && !r.ride_id.is_empty())
            .unwrap_or_else(|| RideRequest {
                id: inserted_id(&value),
                ride_id: request.ride_id.clone(),
                requester_id: request.requester_id.clone(),
                requester_name: request.requester_name.clone(),
                requester_avatar: request.requester_avatar.clone(),
                driver_id: request.driver_id.clone(),
                status: request.status,
                driver_name: request.driver_name.clone(),
                start_location: request.start_location.clone(),
                end_location: request.end_location.clone(),
                date: request.date.clone(),
                time: request.time.clone(),
                price: request.price,
                driver_phone: request.driver_phone.clone(),
            });

        log::info!("📨 Join request created for ride {}", created.ride_id);
        Ok(created)
    }

    async fn update_request_status(&self, id: &str, status: RequestStatus) -> AppResult<()> {
        let path = format!("/requests/{}", urlencoding::encode(id));
        self.call(
            CallKind::Write,
            Method::PATCH,
            &path,
            Some(&StatusUpdate { status }),
            ("Request", id),
        )
        .await?;
        log::info!("✅ Request {} marked {}", id, status);
        Ok(())
    }
}
