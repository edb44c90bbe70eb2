use std::sync::Arc;
use validator::Validate;

use crate::clients::ProviderCredential;
use crate::dto::auth_dto::{CredentialsForm, ProviderLoginForm, SessionResponse};
use crate::services::{RequestsApi, RouteComposer, SessionStore};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AuthController {
    session: Arc<SessionStore>,
    requests: Arc<RequestsApi>,
    composer: Arc<RouteComposer>,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            requests: state.requests.clone(),
            composer: state.composer.clone(),
        }
    }

    pub async fn login(&self, form: CredentialsForm) -> AppResult<SessionResponse> {
        form.validate()?;
        let user = self.session.login(form.email.trim(), &form.password).await?;
        Ok(SessionResponse::signed_in(user))
    }

    pub async fn register(&self, form: CredentialsForm) -> AppResult<SessionResponse> {
        form.validate()?;
        let user = self.session.register(form.email.trim(), &form.password).await?;
        Ok(SessionResponse::signed_in(user))
    }

    pub async fn login_with_provider(&self, form: ProviderLoginForm) -> AppResult<SessionResponse> {
        form.validate()?;
        let credential = ProviderCredential {
            provider_id: form.provider_id,
            id_token: form.id_token,
            access_token: form.access_token,
        };
        let user = self.session.login_with_provider(&credential).await?;
        Ok(SessionResponse::signed_in(user))
    }

    /// Sign out and drop everything tied to the previous user
    pub async fn logout(&self) -> AppResult<SessionResponse> {
        self.session.logout().await?;
        self.requests.clear_submitted().await;
        self.composer.clear_draft().await;
        Ok(SessionResponse::signed_out())
    }
}
