//! Auth session store
//!
//! Process-wide view of who is signed in. The store starts in `Loading`,
//! subscribes once to the identity provider's session notifications and
//! moves to `SignedIn`/`SignedOut` on the first event the provider resolves.
//! Readers watch the state through `subscribe()`; dropping the receiver
//! unsubscribes.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::clients::{AuthStateEvent, IdentityProvider, ProviderCredential};
use crate::models::{Identity, SessionState};
use crate::utils::errors::AppResult;

pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<watch::Sender<SessionState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

/// Publish `next` only when it differs from the current state
fn apply(state: &watch::Sender<SessionState>, next: SessionState) {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        log::info!("🔄 Session state: {:?} -> {:?}", current, next);
        *current = next;
        true
    });
}

impl SessionStore {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            provider,
            state: Arc::new(state),
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to the provider. Calling it again is a no-op.
    pub async fn start(&self) {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return;
        }

        let mut events = self.provider.session_changes();
        let state = self.state.clone();

        *listener = Some(tokio::spawn(async move {
            loop {
                let event = events.borrow_and_update().clone();
                if let AuthStateEvent::Resolved(user) = event {
                    apply(&state, SessionState::from_user(user));
                }
                if events.changed().await.is_err() {
                    log::warn!("⚠️ Identity provider closed its session feed");
                    break;
                }
            }
        }));
        log::info!("👂 Session store listening for identity changes");
    }

    pub async fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.state.borrow().current_user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Identity> {
        let user = self.provider.sign_in(email, password).await?;
        apply(&self.state, SessionState::SignedIn(user.clone()));
        Ok(user)
    }

    pub async fn register(&self, email: &str, password: &str) -> AppResult<Identity> {
        let user = self.provider.sign_up(email, password).await?;
        apply(&self.state, SessionState::SignedIn(user.clone()));
        Ok(user)
    }

    pub async fn login_with_provider(&self, credential: &ProviderCredential) -> AppResult<Identity> {
        let user = self.provider.sign_in_with_provider(credential).await?;
        apply(&self.state, SessionState::SignedIn(user.clone()));
        Ok(user)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.provider.sign_out().await?;
        apply(&self.state, SessionState::SignedOut);
        Ok(())
    }
}
