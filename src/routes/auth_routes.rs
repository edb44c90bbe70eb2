use axum::{extract::State, routing::{get, post}, Json, Router};

use crate::controllers::{AuthController, HomeController};
use crate::dto::auth_dto::{CredentialsForm, ProviderLoginForm, SessionResponse};
use crate::dto::view_dto::FormView;
use crate::middleware::JsonBody;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/login/provider", post(login_with_provider))
        .route("/register", get(register_form).post(register))
        .route("/logout", post(logout))
}

async fn login_form() -> Json<FormView> {
    Json(HomeController::login_form())
}

async fn register_form() -> Json<FormView> {
    Json(HomeController::register_form())
}

async fn login(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<CredentialsForm>,
) -> Result<Json<SessionResponse>, AppError> {
    let response = AuthController::new(&state).login(form).await?;
    Ok(Json(response))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<CredentialsForm>,
) -> Result<Json<SessionResponse>, AppError> {
    let response = AuthController::new(&state).register(form).await?;
    Ok(Json(response))
}

async fn login_with_provider(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<ProviderLoginForm>,
) -> Result<Json<SessionResponse>, AppError> {
    let response = AuthController::new(&state).login_with_provider(form).await?;
    Ok(Json(response))
}

async fn logout(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    let response = AuthController::new(&state).logout().await?;
    Ok(Json(response))
}
