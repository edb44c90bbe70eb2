#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, BodyDataStream},
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tower::ServiceExt;

use carpool::clients::{
    AuthStateEvent, IdentityProvider, MappingService, ProviderCredential, RideDataSource,
};
use carpool::config::environment::EnvironmentConfig;
use carpool::models::{
    Coordinates, Identity, NewRide, NewRideRequest, RequestStatus, Ride, RideRequest, RideUpdate,
    RouteInfo,
};
use carpool::utils::errors::{not_found_error, AppError, AppResult, MappingError};
use carpool::{create_app_router, AppState};

/// One call made against the data API, in wire terms
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// In-memory data API recording every call it receives
#[derive(Default)]
pub struct RecordingDataSource {
    rides: RwLock<Vec<Ride>>,
    requests: RwLock<Vec<RideRequest>>,
    calls: StdMutex<Vec<RecordedCall>>,
    failing_reads: AtomicBool,
    failing_writes: AtomicBool,
}

impl RecordingDataSource {
    pub async fn seed_ride(&self, ride: Value) {
        self.rides
            .write()
            .await
            .push(serde_json::from_value(ride).unwrap());
    }

    pub async fn seed_request(&self, request: Value) {
        self.requests
            .write()
            .await
            .push(serde_json::from_value(request).unwrap());
    }

    /// Change a stored request behind the client's back
    pub async fn set_request_status(&self, id: &str, status: RequestStatus) {
        if let Some(request) = self.requests.write().await.iter_mut().find(|r| r.id == id) {
            request.status = status;
        }
    }

    pub async fn remove_request(&self, id: &str) {
        self.requests.write().await.retain(|r| r.id != id);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.failing_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.failing_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    fn record(&self, method: &'static str, path: String, body: Option<Value>) {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { method, path, body });
    }

    fn read(&self, path: String) -> AppResult<()> {
        self.record("GET", path, None);
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(AppError::DataService("data API unreachable".to_string()));
        }
        Ok(())
    }

    fn write(&self, method: &'static str, path: String, body: Option<Value>) -> AppResult<()> {
        self.record(method, path, body);
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(AppError::Mutation("data API returned 500".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RideDataSource for RecordingDataSource {
    async fn list_rides(&self) -> AppResult<Vec<Ride>> {
        self.read("/search".to_string())?;
        Ok(self.rides.read().await.clone())
    }

    async fn get_ride(&self, id: &str) -> AppResult<Ride> {
        self.read(format!("/search/{}", id))?;
        self.rides
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("Ride", id))
    }

    async fn publish_ride(&self, ride: &NewRide) -> AppResult<Ride> {
        let mut body = serde_json::to_value(ride).unwrap();
        self.write("POST", "/publish".to_string(), Some(body.clone()))?;
        body["_id"] = json!(format!("ride-{}", self.rides.read().await.len() + 1));
        let stored: Ride = serde_json::from_value(body).unwrap();
        self.rides.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update_ride(&self, id: &str, update: &RideUpdate) -> AppResult<()> {
        self.write("PUT", format!("/update/{}", id), Some(serde_json::to_value(update).unwrap()))?;
        let mut rides = self.rides.write().await;
        let ride = rides
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found_error("Ride", id))?;
        if let Some(seats) = update.seats_available {
            ride.seats_available = seats;
        }
        Ok(())
    }

    async fn delete_ride(&self, id: &str) -> AppResult<()> {
        self.write("DELETE", format!("/delete/{}", id), None)?;
        self.rides.write().await.retain(|r| r.id != id);
        Ok(())
    }

    async fn list_requests(&self) -> AppResult<Vec<RideRequest>> {
        self.read("/requests".to_string())?;
        Ok(self.requests.read().await.clone())
    }

    async fn get_request(&self, id: &str) -> AppResult<RideRequest> {
        self.read(format!("/requests/{}", id))?;
        self.requests
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("Request", id))
    }

    async fn create_request(&self, request: &NewRideRequest) -> AppResult<RideRequest> {
        let mut body = serde_json::to_value(request).unwrap();
        self.write("POST", "/requests".to_string(), Some(body.clone()))?;
        body["_id"] = json!(format!("req-{}", self.requests.read().await.len() + 1));
        let stored: RideRequest = serde_json::from_value(body).unwrap();
        self.requests.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update_request_status(&self, id: &str, status: RequestStatus) -> AppResult<()> {
        self.write("PATCH", format!("/requests/{}", id), Some(json!({ "status": status })))?;
        let mut requests = self.requests.write().await;
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found_error("Request", id))?;
        request.status = status;
        Ok(())
    }
}

/// Every place geocodes; every route is 30 km and 45 minutes long
pub struct FixedRouteMapping {
    pub unknown_place: Option<String>,
}

#[async_trait]
impl MappingService for FixedRouteMapping {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, MappingError> {
        if self.unknown_place.as_deref() == Some(place) {
            return Ok(None);
        }
        Ok(Some(Coordinates { lat: 18.52, lon: 73.85 }))
    }

    async fn route(&self, waypoints: &[Coordinates]) -> Result<RouteInfo, MappingError> {
        Ok(RouteInfo {
            coordinates: waypoints.to_vec(),
            distance_m: 30_000.0,
            duration_s: 2_700.0,
            name: Some("Expressway".to_string()),
        })
    }
}

/// Identity provider with a controllable session feed
pub struct ScriptedIdentity {
    events: watch::Sender<AuthStateEvent>,
}

impl ScriptedIdentity {
    pub fn new(initial: AuthStateEvent) -> Self {
        let (events, _) = watch::channel(initial);
        Self { events }
    }

    pub fn emit(&self, event: AuthStateEvent) {
        self.events.send_replace(event);
    }
}

pub fn user(uid: &str) -> Identity {
    Identity {
        uid: uid.to_string(),
        display_name: Some(format!("User {}", uid)),
        photo_url: None,
        email: Some(format!("{}@college.edu", uid)),
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Identity> {
        if password != "secret1" {
            return Err(AppError::Auth("INVALID_PASSWORD".to_string()));
        }
        let identity = user(email.split('@').next().unwrap_or(email));
        self.emit(AuthStateEvent::Resolved(Some(identity.clone())));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Identity> {
        self.sign_in(email, password).await
    }

    async fn sign_in_with_provider(&self, credential: &ProviderCredential) -> AppResult<Identity> {
        let identity = user(&credential.provider_id);
        self.emit(AuthStateEvent::Resolved(Some(identity.clone())));
        Ok(identity)
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.emit(AuthStateEvent::Resolved(None));
        Ok(())
    }

    fn session_changes(&self) -> watch::Receiver<AuthStateEvent> {
        self.events.subscribe()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub data: Arc<RecordingDataSource>,
    pub identity: Arc<ScriptedIdentity>,
}

impl TestApp {
    /// App whose identity provider reports `initial` once started
    pub async fn with_session(initial: AuthStateEvent) -> Self {
        let data = Arc::new(RecordingDataSource::default());
        let identity = Arc::new(ScriptedIdentity::new(initial));
        let mapping = Arc::new(FixedRouteMapping { unknown_place: None });

        let state = AppState::new(
            EnvironmentConfig::default(),
            data.clone(),
            identity.clone(),
            mapping,
        );
        state.session.start().await;
        wait_until_settled(&state, &identity).await;

        Self {
            router: create_app_router(state.clone()),
            state,
            data,
            identity,
        }
    }

    pub async fn signed_out() -> Self {
        Self::with_session(AuthStateEvent::Resolved(None)).await
    }

    pub async fn signed_in_as(uid: &str) -> Self {
        Self::with_session(AuthStateEvent::Resolved(Some(user(uid)))).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, path, Some(body)).await
    }

    /// Open a server-sent event stream; the handler has subscribed once this returns
    pub async fn open_stream(&self, path: &str) -> EventStream {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        EventStream {
            status: response.status(),
            content_type: response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            location,
            body,
        }
    }
}

/// Server-sent event stream read block by block
pub struct EventStream {
    pub status: StatusCode,
    pub content_type: Option<String>,
    body: BodyDataStream,
    buffer: String,
}

impl EventStream {
    /// Next event block, or `None` when the stream ended or stayed quiet
    /// for `wait`
    pub async fn next_event(&mut self, wait: Duration) -> Option<String> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let event = self.buffer[..end].to_string();
                self.buffer.drain(..end + 2);
                return Some(event);
            }
            match tokio::time::timeout(wait, self.body.next()).await {
                Ok(Some(Ok(chunk))) => self.buffer.push_str(&String::from_utf8_lossy(&chunk)),
                _ => return None,
            }
        }
    }

    /// Whether the server closed the stream within `wait`
    pub async fn ends_within(&mut self, wait: Duration) -> bool {
        loop {
            match tokio::time::timeout(wait, self.body.next()).await {
                Ok(None) => return true,
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(_))) | Err(_) => return false,
            }
        }
    }
}

/// Wait for the session store to apply the provider's current event
async fn wait_until_settled(state: &AppState, identity: &ScriptedIdentity) {
    if matches!(*identity.events.borrow(), AuthStateEvent::Unresolved) {
        return;
    }
    let mut rx = state.session.subscribe();
    tokio::time::timeout(
        Duration::from_secs(1),
        rx.wait_for(|s| !s.is_loading()),
    )
    .await
    .expect("session store did not settle")
    .unwrap();
}

pub fn ride_json(id: &str, driver: &str, date: &str) -> Value {
    json!({
        "_id": id,
        "DriverId": driver,
        "driverName": format!("Driver {}", driver),
        "department": "CSE",
        "year": 3,
        "age": 21,
        "drivingexp": 2,
        "vehicle": "Swift",
        "startLocation": "CityA",
        "endLocation": "CityB",
        "routeDescription": "Route: CityA to CityB.",
        "date": date,
        "time": "09:00",
        "seatsAvailable": 3,
        "price": 64.41,
        "phoneNumber": "9876543210"
    })
}

pub fn request_json(id: &str, rider: &str, driver: &str, date: &str) -> Value {
    json!({
        "_id": id,
        "rideId": format!("ride-of-{}", driver),
        "userId": rider,
        "userName": format!("User {}", rider),
        "DriverId": driver,
        "status": "pending",
        "date": date,
        "driverPhone": "9876543210"
    })
}

pub fn publish_form() -> Value {
    json!({
        "driverName": "Ravi",
        "department": "CSE",
        "year": 3,
        "age": 21,
        "experience": 2,
        "startLocation": "CityA",
        "endLocation": "CityB",
        "date": "2030-01-15",
        "time": "09:30",
        "carModel": "Swift",
        "seatsAvailable": 3,
        "phone": "9876543210"
    })
}
