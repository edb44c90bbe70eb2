//! In-memory collaborators for service tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use tokio::sync::{watch, RwLock};

use crate::clients::{AuthStateEvent, IdentityProvider, MappingService, ProviderCredential, RideDataSource};
use crate::models::{
    Coordinates, Identity, NewRide, NewRideRequest, RequestStatus, Ride, RideRequest, RideUpdate,
    RouteInfo,
};
use crate::utils::errors::{not_found_error, AppError, AppResult, MappingError};

pub fn sample_ride(id: &str, date: &str) -> Ride {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "DriverId": "driver-1",
        "driverName": "Ravi",
        "startLocation": "CityA",
        "endLocation": "CityB",
        "date": date,
        "time": "09:00",
        "seatsAvailable": 3,
        "price": 64.41,
        "phoneNumber": "9876543210"
    }))
    .unwrap()
}

pub fn sample_new_ride() -> NewRide {
    NewRide {
        driver_id: "driver-1".to_string(),
        driver_name: "Ravi".to_string(),
        department: "CSE".to_string(),
        year: 3,
        age: 21,
        driving_experience: 2,
        vehicle: "Swift".to_string(),
        start_location: "CityA".to_string(),
        end_location: "CityB".to_string(),
        route_description: "Route: CityA to CityB.".to_string(),
        date: "2030-01-15".to_string(),
        time: "09:30".to_string(),
        seats_available: 3,
        price: 64.41,
        phone_number: "9876543210".to_string(),
    }
}

pub fn identity(uid: &str) -> Identity {
    Identity {
        uid: uid.to_string(),
        display_name: Some(format!("User {}", uid)),
        photo_url: None,
        email: Some(format!("{}@college.edu", uid)),
    }
}

#[derive(Default)]
pub struct FakeDataSource {
    rides: RwLock<Vec<Ride>>,
    requests: RwLock<Vec<RideRequest>>,
    calls: StdMutex<HashMap<&'static str, usize>>,
    next_id: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeDataSource {
    pub async fn insert_ride(&self, ride: Ride) {
        self.rides.write().await.push(ride);
    }

    pub async fn insert_request(&self, request: RideRequest) {
        self.requests.write().await.push(request);
    }

    /// Change a stored request behind the cache's back
    pub async fn set_status(&self, id: &str, status: RequestStatus) {
        if let Some(r) = self.requests.write().await.iter_mut().find(|r| r.id == id) {
            r.status = status;
        }
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, op: &'static str) {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
    }

    fn read(&self, op: &'static str) -> AppResult<()> {
        self.record(op);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::DataService(format!("{} unavailable", op)));
        }
        Ok(())
    }

    fn write(&self, op: &'static str) -> AppResult<()> {
        self.record(op);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Mutation(format!("{} rejected", op)));
        }
        Ok(())
    }

    fn new_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl RideDataSource for FakeDataSource {
    async fn list_rides(&self) -> AppResult<Vec<Ride>> {
        self.read("list_rides")?;
        Ok(self.rides.read().await.clone())
    }

    async fn get_ride(&self, id: &str) -> AppResult<Ride> {
        self.read("get_ride")?;
        self.rides
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("Ride", id))
    }

    async fn publish_ride(&self, ride: &NewRide) -> AppResult<Ride> {
        self.write("publish_ride")?;
        let mut value = serde_json::to_value(ride).map_err(|e| AppError::Internal(e.to_string()))?;
        value["id"] = serde_json::Value::String(self.new_id("ride"));
        let stored: Ride = serde_json::from_value(value).map_err(|e| AppError::Internal(e.to_string()))?;
        self.rides.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update_ride(&self, id: &str, update: &RideUpdate) -> AppResult<()> {
        self.write("update_ride")?;
        let mut rides = self.rides.write().await;
        let ride = rides
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found_error("Ride", id))?;
        if let Some(seats) = update.seats_available {
            ride.seats_available = seats;
        }
        if let Some(price) = update.price {
            ride.price = price;
        }
        Ok(())
    }

    async fn delete_ride(&self, id: &str) -> AppResult<()> {
        self.write("delete_ride")?;
        self.rides.write().await.retain(|r| r.id != id);
        Ok(())
    }

    async fn list_requests(&self) -> AppResult<Vec<RideRequest>> {
        self.read("list_requests")?;
        Ok(self.requests.read().await.clone())
    }

    async fn get_request(&self, id: &str) -> AppResult<RideRequest> {
        self.read("get_request")?;
        self.requests
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("Request", id))
    }

    async fn create_request(&self, request: &NewRideRequest) -> AppResult<RideRequest> {
        self.write("create_request")?;
        let mut value = serde_json::to_value(request).map_err(|e| AppError::Internal(e.to_string()))?;
        value["id"] = serde_json::Value::String(self.new_id("req"));
        let stored: RideRequest =
            serde_json::from_value(value).map_err(|e| AppError::Internal(e.to_string()))?;
        self.requests.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update_request_status(&self, id: &str, status: RequestStatus) -> AppResult<()> {
        self.write("update_request_status")?;
        let mut requests = self.requests.write().await;
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found_error("Request", id))?;
        request.status = status;
        Ok(())
    }
}

/// Geocodes any non-blank place; every route is `distance_km` long
pub struct FakeMapping {
    pub distance_km: f64,
    pub unknown_place: Option<String>,
    geocodes: AtomicUsize,
    routes: AtomicUsize,
}

impl FakeMapping {
    pub fn new(distance_km: f64) -> Self {
        Self {
            distance_km,
            unknown_place: None,
            geocodes: AtomicUsize::new(0),
            routes: AtomicUsize::new(0),
        }
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocodes.load(Ordering::SeqCst)
    }

    pub fn route_calls(&self) -> usize {
        self.routes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MappingService for FakeMapping {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, MappingError> {
        self.geocodes.fetch_add(1, Ordering::SeqCst);
        if self.unknown_place.as_deref() == Some(place) {
            return Ok(None);
        }
        Ok(Some(Coordinates {
            lat: 18.5 + place.len() as f64 / 100.0,
            lon: 73.8,
        }))
    }

    async fn route(&self, waypoints: &[Coordinates]) -> Result<RouteInfo, MappingError> {
        self.routes.fetch_add(1, Ordering::SeqCst);
        Ok(RouteInfo {
            coordinates: waypoints.to_vec(),
            distance_m: self.distance_km * 1000.0,
            duration_s: self.distance_km * 60.0,
            name: Some("NH48".to_string()),
        })
    }
}

/// Identity provider that signs in any non-empty password
pub struct FakeIdentity {
    events: watch::Sender<AuthStateEvent>,
}

impl FakeIdentity {
    /// Provider that has not reported any session yet
    pub fn unresolved() -> Self {
        let (events, _) = watch::channel(AuthStateEvent::Unresolved);
        Self { events }
    }

    pub fn emit(&self, event: AuthStateEvent) {
        self.events.send_replace(event);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Identity> {
        if password.is_empty() {
            return Err(AppError::Auth("INVALID_PASSWORD".to_string()));
        }
        let uid = email.split('@').next().unwrap_or(email);
        let user = identity(uid);
        self.emit(AuthStateEvent::Resolved(Some(user.clone())));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Identity> {
        self.sign_in(email, password).await
    }

    async fn sign_in_with_provider(&self, credential: &ProviderCredential) -> AppResult<Identity> {
        let user = identity(&credential.provider_id);
        self.emit(AuthStateEvent::Resolved(Some(user.clone())));
        Ok(user)
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.emit(AuthStateEvent::Resolved(None));
        Ok(())
    }

    fn session_changes(&self) -> watch::Receiver<AuthStateEvent> {
        self.events.subscribe()
    }
}
