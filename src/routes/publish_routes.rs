use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};

use crate::controllers::PublishController;
use crate::dto::ride_dto::{PublishRideForm, RoutePreviewForm};
use crate::dto::view_dto::{ApiResponse, PublishView, RoutePreview};
use crate::middleware::JsonBody;
use crate::models::{Identity, Ride, RideUpdate};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_publish_router() -> Router<AppState> {
    Router::new()
        .route("/publish", get(publish_form).post(publish_ride))
        .route("/publish/route", post(preview_route))
        .route("/rides/:id", put(update_ride).delete(delete_ride))
}

async fn publish_form(State(state): State<AppState>) -> Json<PublishView> {
    Json(PublishController::new(&state).view().await)
}

async fn preview_route(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<RoutePreviewForm>,
) -> Result<Json<RoutePreview>, AppError> {
    let preview = PublishController::new(&state).preview(form).await?;
    Ok(Json(preview))
}

async fn publish_ride(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    JsonBody(form): JsonBody<PublishRideForm>,
) -> Result<(StatusCode, Json<ApiResponse<Ride>>), AppError> {
    let ride = PublishController::new(&state).publish(&user, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            ride,
            "Ride published successfully".to_string(),
        )),
    ))
}

async fn update_ride(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<RideUpdate>,
) -> Result<Json<ApiResponse<Ride>>, AppError> {
    let ride = PublishController::new(&state).update(&user, &id, patch).await?;
    Ok(Json(ApiResponse::success(ride)))
}

async fn delete_ride(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    PublishController::new(&state).delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
