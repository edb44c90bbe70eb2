use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, patch},
    Extension, Json, Router,
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

use crate::controllers::RequestsController;
use crate::dto::ride_dto::{JoinRideForm, StatusForm};
use crate::dto::view_dto::{JoinRideResponse, RequestCardView, RequestsView};
use crate::middleware::JsonBody;
use crate::models::Identity;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_requests_router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(my_requests).post(join_ride))
        .route("/requests/events", get(request_events))
        .route("/requests/:id", patch(decide_request))
}

async fn my_requests(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
) -> Json<RequestsView> {
    Json(RequestsController::new(&state).list(&user).await)
}

async fn join_ride(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    JsonBody(form): JsonBody<JoinRideForm>,
) -> Result<(StatusCode, Json<JoinRideResponse>), AppError> {
    let response = RequestsController::new(&state).join(&user, form).await?;
    let status = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

async fn decide_request(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<StatusForm>,
) -> Result<Json<RequestCardView>, AppError> {
    let card = RequestsController::new(&state)
        .decide(&user, &id, form.status)
        .await?;
    Ok(Json(card))
}

/// Request changes involving the current user, as server-sent events
async fn request_events(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.feed.subscribe();
    log::info!("📡 {} subscribed to request changes", user.uid);

    let events = stream::unfold((receiver, user.uid), |(mut receiver, uid)| async move {
        loop {
            match receiver.recv().await {
                Ok(change) if change.involves(&uid) => {
                    let event = match Event::default().event("request_change").json_data(&change) {
                        Ok(event) => event,
                        Err(e) => {
                            log::error!("❌ Could not encode request change: {}", e);
                            continue;
                        }
                    };
                    return Some((Ok(event), (receiver, uid)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("⚠️ Request feed subscriber lagged by {} events", skipped);
                    let event = Event::default().event("resync").data(skipped.to_string());
                    return Some((Ok(event), (receiver, uid)));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
