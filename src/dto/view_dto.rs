//! View models
//!
//! JSON shapes returned by the application's pages.

use serde::Serialize;

use crate::models::{Identity, RequestStatus, Ride, RideRequest, RouteInfo, FareEstimate};
use crate::utils::errors::AppError;

// Generic envelope for mutations
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

/// Read result as views consume it: data, or an error flag plus message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_error: bool,
    pub error: Option<QueryError>,
}

#[derive(Debug, Serialize)]
pub struct QueryError {
    pub code: String,
    pub message: String,
}

impl<T> QueryState<T> {
    pub fn from_result(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                is_error: false,
                error: None,
            },
            Err(e) => {
                log::warn!("⚠️ Query failed: {}", e);
                Self {
                    data: None,
                    is_error: true,
                    error: Some(QueryError {
                        code: e.code().to_string(),
                        message: e.to_string(),
                    }),
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub title: &'static str,
    pub user: Option<Identity>,
    pub links: Vec<NavLink>,
}

/// Shown while the session is still being resolved
#[derive(Debug, Serialize)]
pub struct LoadingView {
    pub state: &'static str,
    pub message: &'static str,
}

impl Default for LoadingView {
    fn default() -> Self {
        Self {
            state: "loading",
            message: "Checking your session…",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotFoundView {
    pub title: &'static str,
    pub path: String,
    pub home: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub form: &'static str,
    pub fields: Vec<&'static str>,
    pub alternate: NavLink,
}

#[derive(Debug, Serialize)]
pub struct RideCardView {
    #[serde(flatten)]
    pub ride: Ride,
    pub expired: bool,
    pub contact_link: String,
    pub already_requested: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchView {
    pub heading: String,
    pub total_rides: usize,
    pub search_active: bool,
    pub rides: QueryState<Vec<RideCardView>>,
    pub empty_message: Option<String>,
}

/// Actions available on a request card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardAction {
    /// Driver may accept or reject
    Decide,
    /// Rider is waiting for the driver
    AwaitingDecision,
    Settled { status: RequestStatus },
    /// Ride date has passed
    ContactDriver { link: String },
}

#[derive(Debug, Serialize)]
pub struct RequestCardView {
    #[serde(flatten)]
    pub request: RideRequest,
    pub role: &'static str,
    pub expired: bool,
    pub action: CardAction,
}

#[derive(Debug, Serialize)]
pub struct RequestsView {
    pub heading: &'static str,
    pub requests: QueryState<Vec<RequestCardView>>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutePreview {
    pub start_location: String,
    pub end_location: String,
    pub route: RouteInfo,
    pub description: String,
    pub fare: FareEstimate,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct PublishView {
    pub draft: Option<RoutePreview>,
    pub can_publish: bool,
    pub hint: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct JoinRideResponse {
    pub created: bool,
    pub already_requested: bool,
    pub message: String,
    pub request: Option<RideRequest>,
}
