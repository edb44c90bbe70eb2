use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Identity, SessionState};

// Credential sign-in / sign-up form
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

// Federated sign-in: credential returned by the provider's popup flow
#[derive(Debug, Deserialize, Validate)]
pub struct ProviderLoginForm {
    #[validate(length(min = 1))]
    pub provider_id: String,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

// Session view returned by auth endpoints
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: Option<String>,
    pub session: SessionState,
}

impl SessionResponse {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            success: true,
            message: Some(format!("Signed in as {}", identity.label())),
            session: SessionState::SignedIn(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            success: true,
            message: Some("Signed out".to_string()),
            session: SessionState::SignedOut,
        }
    }
}
