//! Identity provider client
//!
//! Password and federated sign-in go through the Identity Toolkit REST API.
//! Session changes are published on a `watch` channel; a provider that has
//! not yet reported any session is `Unresolved`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

use crate::dto::identity_dto::{
    IdentityAuthResponse, IdentityErrorEnvelope, IdpAuthRequest, PasswordAuthRequest,
};
use crate::models::Identity;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{get_token_remaining_time, is_token_expired, read_id_token_claims};

/// Session notification emitted by a provider
#[derive(Debug, Clone, PartialEq)]
pub enum AuthStateEvent {
    Unresolved,
    Resolved(Option<Identity>),
}

/// Credential returned by a federated provider's sign-in flow
#[derive(Debug, Clone)]
pub struct ProviderCredential {
    pub provider_id: String,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Identity>;
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Identity>;
    async fn sign_in_with_provider(&self, credential: &ProviderCredential) -> AppResult<Identity>;
    async fn sign_out(&self) -> AppResult<()>;

    /// Session-change notifications. The current value is the latest event.
    fn session_changes(&self) -> watch::Receiver<AuthStateEvent>;
}

#[derive(Debug, Clone)]
struct SessionTokens {
    id_token: String,
    refresh_token: Option<String>,
}

pub struct IdentityToolkitClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_uri: String,
    events: watch::Sender<AuthStateEvent>,
    tokens: RwLock<Option<SessionTokens>>,
}

impl IdentityToolkitClient {
    /// No session is persisted between runs, so the provider resolves to
    /// signed-out immediately.
    pub fn new(
        base_url: String,
        api_key: String,
        request_uri: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create identity client: {}", e)))?;

        let (events, _) = watch::channel(AuthStateEvent::Resolved(None));

        Ok(Self {
            client,
            base_url,
            api_key,
            request_uri,
            events,
            tokens: RwLock::new(None),
        })
    }

    /// ID token of the current session, if any
    pub async fn id_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|t| t.id_token.clone())
    }

    async fn authenticate<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> AppResult<Identity> {
        let url = format!("{}/accounts:{}?key={}", self.base_url, endpoint, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Identity service unreachable: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to read identity response: {}", e)))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<IdentityErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.to_string());
            log::warn!("⚠️ accounts:{} rejected: {}", endpoint, reason);
            return Err(AppError::Auth(reason));
        }

        let auth: IdentityAuthResponse = serde_json::from_str(&text)
            .map_err(|e| AppError::Auth(format!("Malformed identity response: {}", e)))?;

        let identity = identity_from_response(&auth);

        *self.tokens.write().await = Some(SessionTokens {
            id_token: auth.id_token,
            refresh_token: auth.refresh_token,
        });
        self.events
            .send_replace(AuthStateEvent::Resolved(Some(identity.clone())));

        log::info!("✅ Signed in as {}", identity.label());
        Ok(identity)
    }
}

/// Project the signed-in identity from an auth response, filling gaps from
/// the ID token claims.
fn identity_from_response(auth: &IdentityAuthResponse) -> Identity {
    let claims = match read_id_token_claims(&auth.id_token) {
        Ok(claims) if is_token_expired(&claims) => {
            log::warn!("⚠️ Provider returned an already expired ID token for {}", claims.uid());
            Some(claims)
        }
        Ok(claims) => {
            log::debug!("ID token valid for {}s", get_token_remaining_time(&claims));
            Some(claims)
        }
        Err(e) => {
            log::warn!("⚠️ Could not read ID token claims: {}", e);
            None
        }
    };

    Identity {
        uid: auth.local_id.clone(),
        display_name: auth
            .display_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| claims.as_ref().and_then(|c| c.name.clone())),
        photo_url: auth
            .photo_url
            .clone()
            .or_else(|| auth.profile_picture.clone())
            .or_else(|| claims.as_ref().and_then(|c| c.picture.clone())),
        email: auth
            .email
            .clone()
            .or_else(|| claims.as_ref().and_then(|c| c.email.clone())),
    }
}

/// `postBody` for `accounts:signInWithIdp`
fn idp_post_body(credential: &ProviderCredential) -> AppResult<String> {
    let mut parts = Vec::new();
    if let Some(token) = &credential.id_token {
        parts.push(format!("id_token={}", urlencoding::encode(token)));
    }
    if let Some(token) = &credential.access_token {
        parts.push(format!("access_token={}", urlencoding::encode(token)));
    }
    if parts.is_empty() {
        return Err(AppError::BadRequest(
            "Provider credential needs an ID token or an access token".to_string(),
        ));
    }
    parts.push(format!("providerId={}", urlencoding::encode(&credential.provider_id)));
    Ok(parts.join("&"))
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Identity> {
        log::info!("🔐 Password sign-in for {}", email);
        let body = PasswordAuthRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.authenticate("signInWithPassword", &body).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Identity> {
        log::info!("📝 Registering {}", email);
        let body = PasswordAuthRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.authenticate("signUp", &body).await
    }

    async fn sign_in_with_provider(&self, credential: &ProviderCredential) -> AppResult<Identity> {
        log::info!("🔐 Federated sign-in with {}", credential.provider_id);
        let body = IdpAuthRequest {
            post_body: idp_post_body(credential)?,
            request_uri: self.request_uri.clone(),
            return_secure_token: true,
            return_idp_credential: true,
        };
        self.authenticate("signInWithIdp", &body).await
    }

    async fn sign_out(&self) -> AppResult<()> {
        let previous = self.tokens.write().await.take();
        if previous.as_ref().and_then(|t| t.refresh_token.as_ref()).is_some() {
            log::debug!("Discarded refresh token");
        }
        self.events.send_replace(AuthStateEvent::Resolved(None));
        log::info!("👋 Signed out");
        Ok(())
    }

    fn session_changes(&self) -> watch::Receiver<AuthStateEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> IdentityToolkitClient {
        IdentityToolkitClient::new(
            "http://127.0.0.1:9".to_string(),
            "test-key".to_string(),
            "http://localhost".to_string(),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_idp_post_body() {
        let credential = ProviderCredential {
            provider_id: "google.com".to_string(),
            id_token: Some("a.b.c".to_string()),
            access_token: None,
        };
        assert_eq!(idp_post_body(&credential).unwrap(), "id_token=a.b.c&providerId=google.com");

        let empty = ProviderCredential {
            provider_id: "google.com".to_string(),
            id_token: None,
            access_token: None,
        };
        assert!(matches!(idp_post_body(&empty), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_identity_prefers_response_fields() {
        let auth = IdentityAuthResponse {
            local_id: "u1".to_string(),
            id_token: "not-a-jwt".to_string(),
            refresh_token: None,
            email: Some("asha@college.edu".to_string()),
            display_name: Some("Asha".to_string()),
            photo_url: None,
            profile_picture: Some("https://img/asha.png".to_string()),
            expires_in: Some("3600".to_string()),
        };
        let identity = identity_from_response(&auth);
        assert_eq!(identity.uid, "u1");
        assert_eq!(identity.display_name.as_deref(), Some("Asha"));
        assert_eq!(identity.photo_url.as_deref(), Some("https://img/asha.png"));
    }

    #[tokio::test]
    async fn test_starts_resolved_and_sign_out_notifies() {
        let client = client();
        let mut rx = client.session_changes();
        assert_eq!(*rx.borrow_and_update(), AuthStateEvent::Resolved(None));

        client.sign_out().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), AuthStateEvent::Resolved(None));
        assert!(client.id_token().await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_auth_error() {
        let result = client().sign_in("a@b.co", "secret1").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
