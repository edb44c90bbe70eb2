use chrono::{Local, NaiveDate};
use std::sync::Arc;
use validator::Validate;

use crate::dto::ride_dto::JoinRideForm;
use crate::dto::view_dto::{CardAction, JoinRideResponse, QueryState, RequestCardView, RequestsView};
use crate::models::{contact_link, Identity, RequestStatus, RideRequest};
use crate::services::{JoinOutcome, RequestsApi, RidesApi};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppResult};

pub struct RequestsController {
    rides: Arc<RidesApi>,
    requests: Arc<RequestsApi>,
}

/// Card for one request as seen by `user`
pub fn request_card(request: RideRequest, user: &Identity, today: NaiveDate) -> RequestCardView {
    let is_driver = request.driver_id == user.uid;
    let expired = request.is_expired_on(today);

    let action = if expired {
        CardAction::ContactDriver {
            link: contact_link(&request.driver_phone, None),
        }
    } else if request.status.is_settled() {
        CardAction::Settled {
            status: request.status,
        }
    } else if is_driver {
        CardAction::Decide
    } else {
        CardAction::AwaitingDecision
    };

    RequestCardView {
        role: if is_driver { "driver" } else { "rider" },
        expired,
        action,
        request,
    }
}

impl RequestsController {
    pub fn new(state: &AppState) -> Self {
        Self {
            rides: state.rides.clone(),
            requests: state.requests.clone(),
        }
    }

    /// Requests where the user is the rider or the driver
    pub async fn list(&self, user: &Identity) -> RequestsView {
        let today = Local::now().date_naive();
        let result = self.requests.fetch_all_requests().await.map(|requests| {
            requests
                .into_iter()
                .filter(|r| r.involves(&user.uid))
                .map(|r| request_card(r, user, today))
                .collect::<Vec<_>>()
        });

        let empty_message = match &result {
            Ok(cards) if cards.is_empty() => Some("No ride requests yet."),
            _ => None,
        };

        RequestsView {
            heading: "My Ride Requests",
            requests: QueryState::from_result(result),
            empty_message,
        }
    }

    pub async fn join(&self, user: &Identity, form: JoinRideForm) -> AppResult<JoinRideResponse> {
        form.validate()?;
        let ride = self.rides.fetch_ride_by_id(form.ride_id.trim()).await?;

        if ride.is_expired() {
            return Err(bad_request_error("This ride has already left"));
        }

        Ok(match self.requests.request_to_join(&ride, user).await? {
            JoinOutcome::Created(request) => JoinRideResponse {
                created: true,
                already_requested: false,
                message: format!("Request sent to {}", ride.driver_name),
                request: Some(request),
            },
            JoinOutcome::AlreadyRequested => JoinRideResponse {
                created: false,
                already_requested: true,
                message: "You have already requested this ride".to_string(),
                request: None,
            },
        })
    }

    pub async fn decide(&self, user: &Identity, request_id: &str, status: RequestStatus) -> AppResult<RequestCardView> {
        let updated = self.requests.decide(request_id, user, status).await?;
        Ok(request_card(updated, user, Local::now().date_naive()))
    }
}
