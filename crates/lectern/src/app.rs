//! The assembled application core.
//!
//! [`LecternBuilder`] wires the layers together from a [`Config`] and a
//! [`Store`] implementation; the resulting [`Lectern`] is the one
//! object a host (desktop shell, web runtime, integration test) holds.
//! It owns the auth controller and the API client and delegates to
//! them, so hosts never assemble the generic types themselves.

use std::sync::Arc;

use lectern_api::{ApiClient, OAuthRedirect};
use lectern_auth::{
    AuthController, AuthError, AuthSnapshot, LoginFlow, NoLoginFlow,
};
use lectern_model::{Role, User};
use lectern_store::{Store, StoreEvent};
use tokio::sync::watch;

use crate::{Config, LecternError};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds a [`Lectern`] from configuration and a storage backend.
pub struct LecternBuilder<S> {
    config: Config,
    store: Arc<S>,
    navigate: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

impl<S: Store> LecternBuilder<S> {
    pub fn new(config: Config, store: Arc<S>) -> Self {
        Self {
            config,
            store,
            navigate: None,
        }
    }

    /// Installs the navigation handler the OAuth flow redirects
    /// through (opening a browser, setting the window location).
    /// Without one, a configured OAuth flow logs the authorize URL
    /// instead of navigating.
    pub fn on_navigate(
        mut self,
        navigate: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.navigate = Some(Box::new(navigate));
        self
    }

    pub fn build(self) -> Result<Lectern<S>, LecternError> {
        let api = ApiClient::new(&self.config.api_base_url, Arc::clone(&self.store))?;

        let login: Box<dyn LoginFlow> = match self.config.oauth {
            Some(oauth) => {
                let navigate = self.navigate.unwrap_or_else(|| {
                    Box::new(|url: &str| {
                        tracing::warn!(
                            url,
                            "no navigation handler installed, not redirecting"
                        );
                    })
                });
                Box::new(OAuthRedirect::new(
                    oauth,
                    Arc::clone(&self.store),
                    move |url: &str| navigate(url),
                ))
            }
            None => Box::new(NoLoginFlow),
        };

        let auth = AuthController::new(
            self.config.auth_mode,
            api.clone(),
            login,
            Arc::clone(&self.store),
        );

        Ok(Lectern {
            auth,
            api,
            store: self.store,
        })
    }
}

// ---------------------------------------------------------------------------
// Application core
// ---------------------------------------------------------------------------

/// The client core: auth lifecycle plus backend access over one shared
/// store.
///
/// Not internally synchronized. Hosts that drive it from several tasks
/// wrap it in a `tokio::sync::Mutex` (see [`spawn_store_listener`]);
/// single-task hosts use it directly.
pub struct Lectern<S> {
    auth: AuthController<ApiClient<S>, Box<dyn LoginFlow>, S>,
    api: ApiClient<S>,
    store: Arc<S>,
}

impl<S: Store> Lectern<S> {
    // -- Auth lifecycle ----------------------------------------------------

    /// Resolves the initial auth state. Call once at startup.
    pub async fn initialize(&mut self) {
        self.auth.initialize().await;
    }

    /// Re-validates the current credential against the backend.
    pub async fn refresh_identity(&mut self) {
        self.auth.refresh_identity().await;
    }

    /// Starts the external login handshake (backend mode).
    pub fn login_with_provider(&self) -> Result<(), AuthError> {
        self.auth.login_with_provider()
    }

    /// Signs in locally as the given role (dev bypass mode).
    pub fn login_as_dev(&mut self, role: Role) -> Result<(), AuthError> {
        self.auth.login_as_dev(role)
    }

    /// Signs out. Never fails.
    pub fn logout(&mut self) {
        self.auth.logout();
    }

    /// Reacts to a credential change made by another instance sharing
    /// the store.
    pub async fn handle_store_event(&mut self, event: &StoreEvent) {
        self.auth.handle_store_event(event).await;
    }

    // -- Read surface ------------------------------------------------------

    /// Auth snapshots, one per transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.auth.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.auth.snapshot()
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    pub fn is_initializing(&self) -> bool {
        self.auth.is_initializing()
    }

    /// The backend client, for schedule calls.
    pub fn api(&self) -> &ApiClient<S> {
        &self.api
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

// ---------------------------------------------------------------------------
// Cross-instance credential propagation
// ---------------------------------------------------------------------------

/// Forwards store events to the controller until the store closes.
///
/// This is what keeps several instances over one shared store in sync:
/// a logout in one is observed as a token-removal event in the others,
/// which drop to anonymous without any network traffic. Events caused
/// by this instance's own writes come back through the channel too;
/// the controller's handling is idempotent, so they are harmless.
pub fn spawn_store_listener<S: Store>(
    store: Arc<S>,
    app: Arc<tokio::sync::Mutex<Lectern<S>>>,
) -> tokio::task::JoinHandle<()> {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    app.lock().await.handle_store_event(&event).await;
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    // The next token-key event we do see triggers a
                    // full identity refresh, which recovers whatever
                    // state the dropped events carried.
                    tracing::warn!(missed, "store event listener lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
