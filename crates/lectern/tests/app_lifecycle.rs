//! End-to-end behavior of the assembled facade: building from config,
//! the dev sign-in path surviving a simulated app restart, and login
//! routing per auth mode.

use std::sync::{Arc, Mutex};

use lectern::{
    AuthError, AuthMode, Config, LecternBuilder, MemoryStore, OAuthConfig,
    Role, Store, keys,
};

fn dev_config() -> Config {
    Config::default()
}

fn backend_config() -> Config {
    Config {
        auth_mode: AuthMode::Backend,
        ..Config::default()
    }
}

// =========================================================================
// Dev bypass mode
// =========================================================================

#[tokio::test]
async fn test_dev_login_survives_simulated_restart() {
    let store = Arc::new(MemoryStore::new());

    // First run: sign in as a teacher.
    {
        let mut app = LecternBuilder::new(dev_config(), Arc::clone(&store))
            .build()
            .unwrap();
        app.initialize().await;
        assert!(app.user().is_none(), "fresh store starts anonymous");

        app.login_as_dev(Role::Teacher).unwrap();
        assert_eq!(app.user().unwrap().id, "dev-teacher");
    }

    // "Restart": a new app over the same store restores the session
    // without any backend involvement.
    let mut app = LecternBuilder::new(dev_config(), Arc::clone(&store))
        .build()
        .unwrap();
    app.initialize().await;

    let user = app.user().expect("restored from the cached snapshot");
    assert_eq!(user.id, "dev-teacher");
    assert_eq!(user.role, Some(Role::Teacher));
    assert!(!app.is_initializing());
}

#[tokio::test]
async fn test_dev_logout_clears_the_shared_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let mut app = LecternBuilder::new(dev_config(), Arc::clone(&store))
        .build()
        .unwrap();
    app.initialize().await;
    app.login_as_dev(Role::Admin).unwrap();

    app.logout();

    assert!(app.user().is_none());
    // The next startup must not resurrect the session.
    let mut next = LecternBuilder::new(dev_config(), Arc::clone(&store))
        .build()
        .unwrap();
    next.initialize().await;
    assert!(next.user().is_none());
}

#[tokio::test]
async fn test_dev_mode_provider_login_is_a_noop() {
    let store = Arc::new(MemoryStore::new());
    let app = LecternBuilder::new(dev_config(), store).build().unwrap();
    // No redirect, no error: dev mode simply ignores it.
    app.login_with_provider().unwrap();
}

// =========================================================================
// Backend mode
// =========================================================================

#[tokio::test]
async fn test_backend_initialize_without_token_needs_no_network() {
    // No token stored means there is nothing to validate, so
    // initialize settles to anonymous without reaching the backend.
    // (The configured base URL points at nothing; a network attempt
    // would not produce a clean anonymous state.)
    let store = Arc::new(MemoryStore::new());
    let mut app = LecternBuilder::new(backend_config(), store)
        .build()
        .unwrap();
    app.initialize().await;

    assert!(app.user().is_none());
    assert!(!app.is_initializing());
}

#[tokio::test]
async fn test_backend_without_oauth_rejects_provider_login() {
    let store = Arc::new(MemoryStore::new());
    let app = LecternBuilder::new(backend_config(), store)
        .build()
        .unwrap();

    let err = app.login_with_provider().unwrap_err();
    assert!(matches!(err, AuthError::Handshake(_)));
}

#[tokio::test]
async fn test_backend_dev_login_is_refused() {
    let store = Arc::new(MemoryStore::new());
    let mut app = LecternBuilder::new(backend_config(), store)
        .build()
        .unwrap();

    let err = app.login_as_dev(Role::Student).unwrap_err();
    assert!(matches!(err, AuthError::DevBypassDisabled));
}

#[tokio::test]
async fn test_oauth_login_navigates_and_parks_state() {
    let store = Arc::new(MemoryStore::new());
    let config = Config {
        auth_mode: AuthMode::Backend,
        oauth: Some(OAuthConfig::new(
            "client-42",
            "http://localhost:3000/callback",
        )),
        ..Config::default()
    };

    let visited: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&visited);
    let app = LecternBuilder::new(config, Arc::clone(&store))
        .on_navigate(move |url| {
            *sink.lock().unwrap() = Some(url.to_string());
        })
        .build()
        .unwrap();

    app.login_with_provider().unwrap();

    let url = visited.lock().unwrap().clone().expect("navigated");
    assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(url.contains("client_id=client-42"));
    assert!(
        store.get(keys::OAUTH_STATE).unwrap().is_some(),
        "state nonce parked for the callback"
    );
}

// =========================================================================
// Cross-instance propagation
// =========================================================================

#[tokio::test]
async fn test_logout_elsewhere_propagates_through_store_events() {
    let store = Arc::new(MemoryStore::new());

    let mut app = LecternBuilder::new(dev_config(), Arc::clone(&store))
        .build()
        .unwrap();
    app.initialize().await;
    app.login_as_dev(Role::Student).unwrap();
    store.set(keys::TOKEN_KEYS[0], "dev-session").unwrap();

    let mut events = store.subscribe();

    // Another instance signs out: it removes the token.
    store.remove(keys::TOKEN_KEYS[0]).unwrap();

    // Pump the events this instance observed into the controller.
    while let Ok(event) = events.try_recv() {
        app.handle_store_event(&event).await;
    }

    assert!(app.user().is_none(), "token removal signs this instance out");
}
