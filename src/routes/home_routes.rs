use axum::{
    extract::State,
    http::{StatusCode, Uri},
    routing::get,
    Json, Router,
};

use crate::controllers::HomeController;
use crate::dto::view_dto::{HomeView, NotFoundView};
use crate::state::AppState;

pub fn create_home_router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

async fn home(State(state): State<AppState>) -> Json<HomeView> {
    Json(HomeController::home(&state.session.state()))
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<NotFoundView>) {
    log::debug!("No page at {}", uri.path());
    (StatusCode::NOT_FOUND, Json(HomeController::not_found(uri.path())))
}
