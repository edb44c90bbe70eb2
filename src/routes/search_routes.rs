use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::SearchController;
use crate::dto::ride_dto::SearchQuery;
use crate::dto::view_dto::{RideCardView, SearchView};
use crate::models::Identity;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_search_router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/search/:id", get(ride_detail))
}

async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchView> {
    Json(SearchController::new(&state).list(&user, &query).await)
}

async fn ride_detail(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<RideCardView>, AppError> {
    let card = SearchController::new(&state).detail(&user, &id).await?;
    Ok(Json(card))
}
