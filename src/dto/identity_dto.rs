//! Identity Toolkit wire formats

use serde::{Deserialize, Serialize};

/// Body of `accounts:signInWithPassword` and `accounts:signUp`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordAuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Body of `accounts:signInWithIdp`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpAuthRequest {
    pub post_body: String,
    pub request_uri: String,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

/// Successful auth response shared by the three endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAuthResponse {
    pub local_id: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdentityErrorEnvelope {
    pub error: IdentityErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct IdentityErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}
