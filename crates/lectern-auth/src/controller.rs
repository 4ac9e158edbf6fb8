//! The auth controller: owns the session and drives every transition.
//!
//! This is the central piece of the auth layer. It's responsible for:
//! - Resolving the identity at startup (`initialize`)
//! - Re-checking it on demand (`refresh_identity`)
//! - Dev-bypass logins and the external handshake
//! - Clearing everything on logout
//! - Reacting to credential changes made by other "tabs"
//!
//! # Concurrency note
//!
//! `AuthController` is NOT internally synchronized — every mutating
//! operation takes `&mut self`. This is intentional: there is exactly
//! one logical writer per tab, and an embedder that shares the
//! controller across tasks wraps it in a `tokio::sync::Mutex` at a
//! higher level. Overlapping `initialize`/`refresh_identity` calls
//! therefore serialize; the last one to run wins and callers get no
//! ordering promise beyond that.
//!
//! Readers never touch the controller: they hold a watch receiver from
//! [`AuthController::subscribe`] and see a fresh [`AuthSnapshot`] after
//! every transition.

use std::sync::Arc;

use lectern_model::{Role, User};
use lectern_store::{Store, StoreEvent, keys};
use tokio::sync::watch;

use crate::session::{load_snapshot, save_snapshot};
use crate::{
    AuthError, AuthMode, AuthPhase, AuthSnapshot, IdentityProvider,
    LoginFlow, dev_user,
};

/// Single source of truth for "who is logged in".
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ initialize() ──┬──→ Anonymous ──(login_as_dev /
///                          │                 external credential)──┐
///                          └──→ Authenticated ←────────────────────┘
///                                   │
///                                   ▼ logout() / credential rejected
///                               Anonymous
/// ```
///
/// Every transition persists (or clears) the serialized snapshot in the
/// store, so the next startup can restore the visible state before any
/// network round trip.
pub struct AuthController<P, L, S> {
    /// Which credential source is authoritative. Fixed at construction.
    mode: AuthMode,

    /// Identity endpoint access (production strategy).
    provider: P,

    /// External login handshake (production strategy).
    login: L,

    /// Shared storage: tokens, cached snapshot. Shared with the HTTP
    /// layer, which reads the same token keys for outbound requests.
    store: Arc<S>,

    /// Current state machine position.
    phase: AuthPhase,

    /// `true` from construction until the first `initialize` settles.
    /// Tracked separately from `phase` so the optimistic restore can
    /// publish a provisional user while still initializing.
    initializing: bool,

    /// Publishes [`AuthSnapshot`]s to subscribers.
    snapshot_tx: watch::Sender<AuthSnapshot>,
}

impl<P, L, S> AuthController<P, L, S>
where
    P: IdentityProvider,
    L: LoginFlow,
    S: Store,
{
    /// Creates a controller in the `Uninitialized` phase.
    ///
    /// Nothing is resolved yet: subscribers see the default snapshot
    /// (anonymous, initializing) until [`initialize`](Self::initialize)
    /// runs.
    pub fn new(mode: AuthMode, provider: P, login: L, store: Arc<S>) -> Self {
        let (snapshot_tx, _) = watch::channel(AuthSnapshot::default());
        tracing::debug!(%mode, "auth controller created");
        Self {
            mode,
            provider,
            login,
            store,
            phase: AuthPhase::Uninitialized,
            initializing: true,
            snapshot_tx,
        }
    }

    // -- Read surface ------------------------------------------------------

    /// A receiver that yields a fresh snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// The current snapshot (user + initializing flag).
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            user: self.phase.user().cloned(),
            initializing: self.initializing,
        }
    }

    /// The current user, if authenticated.
    pub fn user(&self) -> Option<&User> {
        self.phase.user()
    }

    /// `true` until the first `initialize()` settles.
    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    /// The current state machine position.
    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    /// The credential strategy this controller was built with.
    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    // -- Operations --------------------------------------------------------

    /// Resolves the identity at application start.
    ///
    /// Dev bypass: restore the cached synthetic user, or anonymous.
    /// Backend: restore the cached snapshot optimistically, then
    /// reconcile against the identity endpoint — no token means
    /// anonymous, a rejected or unreachable check clears all
    /// credentials and means anonymous.
    ///
    /// Always settles: after this returns, `is_initializing()` is
    /// `false` and the phase is `Anonymous` or `Authenticated`.
    /// Calling it again is equivalent to `refresh_identity()`, which
    /// makes the operation idempotent when credentials are unchanged.
    pub async fn initialize(&mut self) {
        if !matches!(self.phase, AuthPhase::Uninitialized) {
            tracing::debug!("initialize called again, refreshing instead");
            return self.refresh_identity().await;
        }

        self.set_phase(AuthPhase::Initializing);

        match self.mode {
            AuthMode::DevBypass => self.restore_cached(),
            AuthMode::Backend => {
                // Optimistic restore: show the last known user while
                // the network check is in flight. The reconcile below
                // overwrites or clears it.
                if let Some(user) = load_snapshot(self.store.as_ref()) {
                    self.set_phase(AuthPhase::Authenticated(user));
                }
                self.resolve_backend_identity().await;
            }
        }

        self.initializing = false;
        self.publish();
        tracing::info!(phase = %self.phase, "auth initialized");
    }

    /// Re-runs the identity check without a full re-initialize.
    ///
    /// Callable at any time, e.g. after an external credential change.
    /// In dev bypass this re-reads the cached snapshot; in backend mode
    /// it repeats the token-then-endpoint resolution.
    pub async fn refresh_identity(&mut self) {
        match self.mode {
            AuthMode::DevBypass => self.restore_cached(),
            AuthMode::Backend => self.resolve_backend_identity().await,
        }
    }

    /// Begins the external redirect-based login handshake.
    ///
    /// In dev-bypass mode this is a documented no-op: it logs a warning
    /// instead of redirecting, because dev mode never touches the real
    /// provider. Completion in backend mode is observed later as a
    /// credential appearing in storage, not as a return value here.
    pub fn login_with_provider(&self) -> Result<(), AuthError> {
        if self.mode.is_dev() {
            tracing::warn!(
                "login_with_provider called in dev-bypass mode, ignoring redirect"
            );
            return Ok(());
        }
        self.login.begin()
    }

    /// Dev bypass only: logs in as a synthesized identity for `role`.
    ///
    /// The identity is deterministic (`dev-{role}`), persisted like a
    /// real session, and immediately authenticated. In backend mode the
    /// call is rejected outright so a production configuration cannot
    /// expose a silent login path.
    pub fn login_as_dev(&mut self, role: Role) -> Result<(), AuthError> {
        if !self.mode.is_dev() {
            return Err(AuthError::DevBypassDisabled);
        }

        let user = dev_user(role);
        save_snapshot(self.store.as_ref(), Some(&user));
        tracing::info!(%role, "dev login");
        self.set_phase(AuthPhase::Authenticated(user));
        Ok(())
    }

    /// Clears all local credentials and transitions to anonymous.
    ///
    /// Never fails and is idempotent: logging out while anonymous just
    /// re-publishes the anonymous snapshot. Storage failures are logged
    /// and swallowed — the in-memory state downgrades regardless.
    pub fn logout(&mut self) {
        self.clear_credentials();
        tracing::info!("logged out");
        self.set_phase(AuthPhase::Anonymous);
    }

    /// Reacts to a storage mutation made by another tab or process.
    ///
    /// A token key appearing means someone logged in elsewhere:
    /// re-resolve the identity. A token key disappearing means a logout
    /// elsewhere: drop to anonymous immediately, with no network round
    /// trip. Non-credential keys are ignored.
    pub async fn handle_store_event(&mut self, event: &StoreEvent) {
        if !keys::is_token_key(&event.key) {
            return;
        }
        match &event.new_value {
            Some(_) => {
                tracing::debug!(
                    key = %event.key,
                    "external credential appeared, re-resolving identity"
                );
                self.refresh_identity().await;
            }
            None => {
                tracing::debug!(
                    key = %event.key,
                    "external credential removed, dropping session"
                );
                save_snapshot(self.store.as_ref(), None);
                self.set_phase(AuthPhase::Anonymous);
            }
        }
    }

    // -- Internals ---------------------------------------------------------

    /// Dev-bypass resolution: the cached snapshot IS the identity.
    fn restore_cached(&mut self) {
        match load_snapshot(self.store.as_ref()) {
            Some(user) => {
                tracing::debug!(id = %user.id, "restored cached dev session");
                self.set_phase(AuthPhase::Authenticated(user));
            }
            None => self.set_phase(AuthPhase::Anonymous),
        }
    }

    /// Backend resolution: token check, then the identity endpoint.
    ///
    /// Fail-closed on every path: any doubt ends in `Anonymous` with
    /// credentials cleared, never an error to the caller.
    async fn resolve_backend_identity(&mut self) {
        if lectern_store::current_token(self.store.as_ref()).is_none() {
            save_snapshot(self.store.as_ref(), None);
            self.set_phase(AuthPhase::Anonymous);
            return;
        }

        match self.provider.fetch_identity().await {
            Ok(user) => {
                save_snapshot(self.store.as_ref(), Some(&user));
                self.set_phase(AuthPhase::Authenticated(user));
            }
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    "identity check failed, clearing credentials"
                );
                self.clear_credentials();
                self.set_phase(AuthPhase::Anonymous);
            }
        }
    }

    /// Removes every stored credential and the cached snapshot.
    fn clear_credentials(&self) {
        for key in keys::TOKEN_KEYS {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "token remove failed");
            }
        }
        save_snapshot(self.store.as_ref(), None);
    }

    /// Transitions the state machine and publishes a fresh snapshot.
    fn set_phase(&mut self, next: AuthPhase) {
        if self.phase != next {
            tracing::debug!(from = %self.phase, to = %next, "auth transition");
        }
        self.phase = next;
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `AuthController`.
    //!
    //! The identity endpoint is mocked with a call counter so tests can
    //! assert not just the resulting state but whether the network was
    //! consulted at all (the cross-tab removal scenario requires that
    //! it is NOT).

    use std::sync::atomic::{AtomicUsize, Ordering};

    use lectern_model::UserStatus;
    use lectern_store::MemoryStore;

    use super::*;

    // -- Mocks ------------------------------------------------------------

    /// What the mock identity endpoint should answer.
    enum Identity {
        Accept(User),
        Reject,
    }

    struct MockProvider {
        identity: Identity,
        calls: Arc<AtomicUsize>,
    }

    impl MockProvider {
        fn accepting(user: User) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    identity: Identity::Accept(user),
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }

        fn rejecting() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    identity: Identity::Reject,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl IdentityProvider for MockProvider {
        fn fetch_identity(
            &self,
        ) -> impl std::future::Future<Output = Result<User, AuthError>> + Send
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = match &self.identity {
                Identity::Accept(user) => Ok(user.clone()),
                Identity::Reject => Err(AuthError::CredentialRejected(
                    "token expired".into(),
                )),
            };
            async move { result }
        }
    }

    struct MockFlow {
        begun: Arc<AtomicUsize>,
    }

    impl MockFlow {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let begun = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    begun: Arc::clone(&begun),
                },
                begun,
            )
        }
    }

    impl LoginFlow for MockFlow {
        fn begin(&self) -> Result<(), AuthError> {
            self.begun.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    // -- Helpers ----------------------------------------------------------

    fn backend_user() -> User {
        User {
            id: "u-42".into(),
            name: "Backend User".into(),
            email: "u42@uni.edu".into(),
            role: Some(Role::Teacher),
            status: UserStatus::Active,
        }
    }

    type TestController = AuthController<MockProvider, MockFlow, MemoryStore>;

    fn dev_controller(
        store: Arc<MemoryStore>,
    ) -> (TestController, Arc<AtomicUsize>) {
        let (provider, calls) = MockProvider::rejecting();
        let (flow, _) = MockFlow::new();
        (
            AuthController::new(AuthMode::DevBypass, provider, flow, store),
            calls,
        )
    }

    fn backend_controller(
        store: Arc<MemoryStore>,
        identity: Identity,
    ) -> (TestController, Arc<AtomicUsize>) {
        let (provider, calls) = match identity {
            Identity::Accept(user) => MockProvider::accepting(user),
            Identity::Reject => MockProvider::rejecting(),
        };
        let (flow, _) = MockFlow::new();
        (
            AuthController::new(AuthMode::Backend, provider, flow, store),
            calls,
        )
    }

    // =====================================================================
    // initialize()
    // =====================================================================

    #[tokio::test]
    async fn test_initialize_dev_no_cache_settles_anonymous() {
        let store = Arc::new(MemoryStore::new());
        let (mut auth, calls) = dev_controller(store);

        assert!(auth.is_initializing());
        auth.initialize().await;

        assert_eq!(auth.user(), None);
        assert!(!auth.is_initializing());
        assert_eq!(calls.load(Ordering::SeqCst), 0, "dev mode must not call out");
    }

    #[tokio::test]
    async fn test_initialize_dev_restores_cached_session() {
        let store = Arc::new(MemoryStore::new());

        // A previous run logged in as dev teacher.
        {
            let (mut auth, _) = dev_controller(Arc::clone(&store));
            auth.initialize().await;
            auth.login_as_dev(Role::Teacher).unwrap();
        }

        // Simulated reload: fresh controller, same store.
        let (mut auth, _) = dev_controller(store);
        auth.initialize().await;

        let user = auth.user().expect("session should be restored");
        assert_eq!(user.id, "dev-teacher");
        assert_eq!(user.role, Some(Role::Teacher));
        assert!(!auth.is_initializing());
    }

    #[tokio::test]
    async fn test_initialize_backend_no_token_is_anonymous_without_network() {
        let store = Arc::new(MemoryStore::new());
        let (mut auth, calls) =
            backend_controller(store, Identity::Accept(backend_user()));

        auth.initialize().await;

        assert_eq!(auth.user(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initialize_backend_valid_token_authenticates() {
        let store = Arc::new(MemoryStore::new());
        store.set("access_token", "tok").unwrap();
        let (mut auth, calls) = backend_controller(
            Arc::clone(&store),
            Identity::Accept(backend_user()),
        );

        auth.initialize().await;

        assert_eq!(auth.user().map(|u| u.id.as_str()), Some("u-42"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // The snapshot was persisted for the next reload.
        assert!(
            store.get(keys::SESSION_SNAPSHOT).unwrap().is_some(),
            "snapshot should be cached"
        );
    }

    #[tokio::test]
    async fn test_initialize_backend_rejected_token_clears_credentials() {
        let store = Arc::new(MemoryStore::new());
        store.set("access_token", "stale").unwrap();
        let (mut auth, _) =
            backend_controller(Arc::clone(&store), Identity::Reject);

        auth.initialize().await;

        assert_eq!(auth.user(), None);
        assert!(!auth.is_initializing());
        assert_eq!(store.get("access_token").unwrap(), None, "token cleared");
        assert_eq!(store.get(keys::SESSION_SNAPSHOT).unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_twice_yields_same_session() {
        let store = Arc::new(MemoryStore::new());
        store.set("access_token", "tok").unwrap();
        let (mut auth, _) = backend_controller(
            Arc::clone(&store),
            Identity::Accept(backend_user()),
        );

        auth.initialize().await;
        let first = auth.snapshot();

        auth.initialize().await;
        let second = auth.snapshot();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_initialize_publishes_to_subscribers() {
        let store = Arc::new(MemoryStore::new());
        let (mut auth, _) = dev_controller(store);
        let rx = auth.subscribe();

        assert!(rx.borrow().initializing);
        auth.initialize().await;

        let snap = rx.borrow();
        assert!(!snap.initializing);
        assert_eq!(snap.user, None);
    }

    // =====================================================================
    // refresh_identity()
    // =====================================================================

    #[tokio::test]
    async fn test_refresh_rejected_token_downgrades_to_anonymous() {
        // The spec §8 scenario: token present, endpoint rejects it.
        let store = Arc::new(MemoryStore::new());
        store.set("lectern_token", "stale").unwrap();
        let (mut auth, _) =
            backend_controller(Arc::clone(&store), Identity::Reject);
        auth.initialize().await;

        // Someone re-adds a bad token out of band.
        store.set("lectern_token", "still-stale").unwrap();
        auth.refresh_identity().await;

        assert_eq!(auth.user(), None);
        assert_eq!(store.get("lectern_token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_dev_follows_cached_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let (mut auth, calls) = dev_controller(Arc::clone(&store));
        auth.initialize().await;
        assert_eq!(auth.user(), None);

        // Another tab wrote a dev session.
        save_snapshot(store.as_ref(), Some(&dev_user(Role::Admin)));
        auth.refresh_identity().await;

        assert_eq!(auth.user().map(|u| u.id.as_str()), Some("dev-admin"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    // =====================================================================
    // login_with_provider() / login_as_dev()
    // =====================================================================

    #[tokio::test]
    async fn test_login_with_provider_dev_mode_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let (provider, _) = MockProvider::rejecting();
        let (flow, begun) = MockFlow::new();
        let auth: TestController =
            AuthController::new(AuthMode::DevBypass, provider, flow, store);

        auth.login_with_provider().expect("noop should succeed");
        assert_eq!(begun.load(Ordering::SeqCst), 0, "no redirect in dev mode");
    }

    #[tokio::test]
    async fn test_login_with_provider_backend_begins_handshake() {
        let store = Arc::new(MemoryStore::new());
        let (provider, _) = MockProvider::rejecting();
        let (flow, begun) = MockFlow::new();
        let auth: TestController =
            AuthController::new(AuthMode::Backend, provider, flow, store);

        auth.login_with_provider().unwrap();
        assert_eq!(begun.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_as_dev_authenticates_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let (mut auth, _) = dev_controller(Arc::clone(&store));
        auth.initialize().await;

        auth.login_as_dev(Role::Student).unwrap();

        assert_eq!(auth.user().map(|u| u.id.as_str()), Some("dev-student"));
        assert!(store.get(keys::SESSION_SNAPSHOT).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_as_dev_rejected_in_backend_mode() {
        let store = Arc::new(MemoryStore::new());
        let (mut auth, _) =
            backend_controller(store, Identity::Accept(backend_user()));
        auth.initialize().await;

        let result = auth.login_as_dev(Role::Admin);

        assert!(matches!(result, Err(AuthError::DevBypassDisabled)));
        assert_eq!(auth.user(), None, "state must be untouched");
    }

    // =====================================================================
    // logout()
    // =====================================================================

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let store = Arc::new(MemoryStore::new());
        store.set("access_token", "tok").unwrap();
        let (mut auth, _) = backend_controller(
            Arc::clone(&store),
            Identity::Accept(backend_user()),
        );
        auth.initialize().await;
        assert!(auth.user().is_some());

        auth.logout();

        assert_eq!(auth.user(), None);
        assert_eq!(store.get("access_token").unwrap(), None);
        assert_eq!(store.get("lectern_token").unwrap(), None);
        assert_eq!(store.get(keys::SESSION_SNAPSHOT).unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent_when_anonymous() {
        let store = Arc::new(MemoryStore::new());
        let (mut auth, _) = dev_controller(store);
        auth.initialize().await;

        auth.logout();
        auth.logout();

        assert_eq!(auth.user(), None);
        assert_eq!(*auth.phase(), AuthPhase::Anonymous);
    }

    // =====================================================================
    // handle_store_event()
    // =====================================================================

    #[tokio::test]
    async fn test_external_token_removal_drops_session_without_network() {
        let store = Arc::new(MemoryStore::new());
        store.set("access_token", "tok").unwrap();
        let (mut auth, calls) = backend_controller(
            Arc::clone(&store),
            Identity::Accept(backend_user()),
        );
        auth.initialize().await;
        assert!(auth.user().is_some());
        let calls_after_init = calls.load(Ordering::SeqCst);

        // Another tab logged out: the token key disappears.
        store.remove("access_token").unwrap();
        auth.handle_store_event(&StoreEvent {
            key: "access_token".into(),
            new_value: None,
        })
        .await;

        assert_eq!(auth.user(), None);
        assert_eq!(
            calls.load(Ordering::SeqCst),
            calls_after_init,
            "removal must not trigger an identity call"
        );
    }

    #[tokio::test]
    async fn test_external_token_appearance_resolves_identity() {
        let store = Arc::new(MemoryStore::new());
        let (mut auth, calls) = backend_controller(
            Arc::clone(&store),
            Identity::Accept(backend_user()),
        );
        auth.initialize().await;
        assert_eq!(auth.user(), None);

        // Another tab logged in: a token key appears.
        store.set("access_token", "fresh").unwrap();
        auth.handle_store_event(&StoreEvent {
            key: "access_token".into(),
            new_value: Some("fresh".into()),
        })
        .await;

        assert_eq!(auth.user().map(|u| u.id.as_str()), Some("u-42"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unrelated_store_event_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.set("access_token", "tok").unwrap();
        let (mut auth, calls) = backend_controller(
            Arc::clone(&store),
            Identity::Accept(backend_user()),
        );
        auth.initialize().await;
        let calls_after_init = calls.load(Ordering::SeqCst);

        auth.handle_store_event(&StoreEvent {
            key: "theme".into(),
            new_value: Some("dark".into()),
        })
        .await;

        assert!(auth.user().is_some(), "session must be untouched");
        assert_eq!(calls.load(Ordering::SeqCst), calls_after_init);
    }
}
