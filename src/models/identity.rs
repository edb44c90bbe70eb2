//! Signed-in identity
//!
//! Read-only projection of the identity provider's current user.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Name shown in views: display name, else e-mail, else the uid
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Session state as seen by the rest of the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "user", rename_all = "snake_case")]
pub enum SessionState {
    /// No session event received yet
    Loading,
    SignedOut,
    SignedIn(Identity),
}

impl SessionState {
    pub fn from_user(user: Option<Identity>) -> Self {
        match user {
            Some(identity) => SessionState::SignedIn(identity),
            None => SessionState::SignedOut,
        }
    }

    pub fn current_user(&self) -> Option<&Identity> {
        match self {
            SessionState::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}
