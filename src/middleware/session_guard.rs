//! Session guard for pages that need a signed-in user
//!
//! While the session is still loading the guard answers with an explicit
//! loading view. Signed-out visitors are redirected to `/login` before the
//! handler runs, so no data-service request is made on their behalf.
//! Signed-in requests carry the current `Identity` as an extension.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::dto::view_dto::LoadingView;
use crate::models::SessionState;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";

pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.session.state() {
        SessionState::Loading => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(LoadingView::default())).into_response()
        }
        SessionState::SignedOut => {
            log::info!("🔒 {} requires a session, redirecting to {}", request.uri().path(), LOGIN_PATH);
            Redirect::to(LOGIN_PATH).into_response()
        }
        SessionState::SignedIn(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
    }
}
