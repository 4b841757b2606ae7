//! Integration tests for the session lifecycle: silent bootstrap, explicit
//! sign-in/sign-up, the availability fallbacks and the timing contracts.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{client_for, test_timeouts, unreachable_base_url, ReceivedRequest, StubReply, StubServer};
use vizinha_link::models::Perfil;
use vizinha_link::{
    MemorySessionStore, SessionStore, StoredSession, VizinhaLinkClient, VizinhaLinkError,
    VizinhaLinkTimeouts,
};

fn auth_session_body() -> String {
    r#"{"access_token":"tok-1","refresh_token":"ref-1","expires_in":3600,
        "user":{"id":"u-1","email":"ana@example.com"}}"#
        .to_string()
}

fn usuario_row(verificado: bool) -> String {
    format!(
        r#"{{"id":"u-1","nome":"Ana Silva","email":"ana@example.com",
            "perfil":"morador","verificado":{}}}"#,
        verificado
    )
}

fn stored_session() -> StoredSession {
    StoredSession {
        access_token: "tok-1".to_string(),
        refresh_token: Some("ref-1".to_string()),
        user_id: "u-1".to_string(),
        email: Some("ana@example.com".to_string()),
    }
}

/// A backend where every session operation succeeds.
fn happy_backend(req: &ReceivedRequest) -> StubReply {
    match (req.method.as_str(), req.route()) {
        ("POST", "/auth/v1/token") => StubReply::json(200, auth_session_body()),
        ("POST", "/auth/v1/signup") => StubReply::json(200, auth_session_body()),
        ("GET", "/auth/v1/user") => {
            StubReply::json(200, r#"{"id":"u-1","email":"ana@example.com"}"#)
        }
        ("POST", "/auth/v1/logout") => StubReply::no_content(),
        ("GET", "/rest/v1/usuario") => StubReply::json(200, format!("[{}]", usuario_row(true))),
        _ => StubReply::json(404, r#"{"message":"unexpected request"}"#),
    }
}

fn client_with_store(base_url: &str, store: Arc<MemorySessionStore>) -> VizinhaLinkClient {
    VizinhaLinkClient::builder()
        .base_url(base_url)
        .api_key("test-anon-key")
        .timeouts(test_timeouts())
        .session_store(store)
        .build()
        .expect("build client")
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
async fn test_bootstrap_without_stored_session_settles_anonymous() {
    let base_url = unreachable_base_url().await;
    let client = client_with_store(&base_url, Arc::new(MemorySessionStore::new()));

    client.session().bootstrap().await;

    let state = client.session().state();
    assert!(!state.is_authenticated);
    assert!(!state.is_verified);
    assert!(!state.is_loading);
    assert!(state.current_user.is_none());
}

#[tokio::test]
async fn test_bootstrap_with_dead_backend_settles_anonymous() {
    let base_url = unreachable_base_url().await;
    let store = Arc::new(MemorySessionStore::new());
    store.save(&stored_session()).expect("seed store");
    let client = client_with_store(&base_url, store);

    client.session().bootstrap().await;

    let state = client.session().state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_bootstrap_with_hung_backend_settles_within_the_timeout_bound() {
    // The backend accepts the connection and then never answers in time.
    let server = StubServer::start(|_req| {
        StubReply::json(200, r#"{"id":"u-1"}"#).with_delay(Duration::from_secs(1))
    })
    .await;
    let store = Arc::new(MemorySessionStore::new());
    store.save(&stored_session()).expect("seed store");
    let client = client_with_store(&server.base_url, store);

    let started = Instant::now();
    client.session().bootstrap().await;
    let elapsed = started.elapsed();

    let state = client.session().state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert!(
        elapsed < Duration::from_millis(900),
        "bootstrap took {:?}, longer than the session timeout bound",
        elapsed
    );
}

#[tokio::test]
async fn test_bootstrap_restores_session_and_profile() {
    let server = StubServer::start(happy_backend).await;
    let store = Arc::new(MemorySessionStore::new());
    store.save(&stored_session()).expect("seed store");
    let client = client_with_store(&server.base_url, store);

    client.session().bootstrap().await;

    let state = client.session().state();
    assert!(state.is_authenticated);
    assert!(state.is_verified);
    let usuario = state.current_user.expect("profile cached");
    assert_eq!(usuario.nome, "Ana Silva");

    // the profile fetch runs under the restored token, not the public key
    let profile_fetch = server
        .requests()
        .into_iter()
        .find(|req| req.route() == "/rest/v1/usuario")
        .expect("profile was fetched");
    assert_eq!(profile_fetch.header("authorization"), Some("Bearer tok-1"));
    assert!(profile_fetch.has_query_pair("id", "eq.u-1"));
}

#[tokio::test]
async fn test_spawn_bootstrap_defers_then_reconciles() {
    let server = StubServer::start(happy_backend).await;
    let store = Arc::new(MemorySessionStore::new());
    store.save(&stored_session()).expect("seed store");

    let timeouts = VizinhaLinkTimeouts::builder()
        .session_timeout(Duration::from_secs(1))
        .bootstrap_delay(Duration::from_millis(100))
        .build();
    let client = VizinhaLinkClient::builder()
        .base_url(server.base_url.clone())
        .api_key("test-anon-key")
        .timeouts(timeouts)
        .session_store(store)
        .build()
        .expect("build client");

    let handle = client.spawn_bootstrap();

    // guards evaluating during the deferral see the settled anonymous state
    assert!(!client.session().is_authenticated());
    assert!(!client.session().is_loading());

    handle.await.expect("bootstrap task");
    assert!(client.session().is_authenticated());
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_sign_in_loads_the_full_profile() {
    let server = StubServer::start(happy_backend).await;
    let client = client_for(&server);

    client
        .session()
        .sign_in("ana@example.com", "secret")
        .await
        .expect("sign-in should succeed");

    let state = client.session().state();
    assert!(state.is_authenticated);
    assert!(state.is_verified);
    assert_eq!(state.current_user.expect("profile").nome, "Ana Silva");

    // fast path first: the initial profile fetch carries no relation embed
    let profile_fetch = server
        .requests()
        .into_iter()
        .find(|req| req.route() == "/rest/v1/usuario")
        .expect("profile was fetched");
    assert_eq!(profile_fetch.query_value("select").as_deref(), Some("*"));
}

#[tokio::test]
async fn test_sign_in_with_slow_profile_fetch_still_authenticates() {
    let server = StubServer::start(|req| match (req.method.as_str(), req.route()) {
        ("POST", "/auth/v1/token") => StubReply::json(200, auth_session_body()),
        ("GET", "/rest/v1/usuario") => StubReply::json(200, format!("[{}]", usuario_row(true)))
            .with_delay(Duration::from_secs(1)),
        _ => StubReply::json(404, r#"{"message":"unexpected request"}"#),
    })
    .await;
    let client = client_for(&server);

    client
        .session()
        .sign_in("ana@example.com", "secret")
        .await
        .expect("a slow profile fetch must not fail the sign-in");

    let state = client.session().state();
    assert!(state.is_authenticated, "sign-in stands without the profile");
    assert!(!state.is_verified);
    let usuario = state.current_user.expect("minimal profile synthesized");
    assert_eq!(usuario.nome, "ana", "named after the email local-part");
    assert_eq!(usuario.email, "ana@example.com");
}

#[tokio::test]
async fn test_sign_in_bad_credentials_surfaces_the_backend_message() {
    let server = StubServer::start(|req| match (req.method.as_str(), req.route()) {
        ("POST", "/auth/v1/token") => StubReply::json(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        ),
        _ => StubReply::json(404, r#"{"message":"unexpected request"}"#),
    })
    .await;
    let client = client_for(&server);

    let err = client
        .session()
        .sign_in("ana@example.com", "wrong")
        .await
        .expect_err("bad credentials must fail");
    match err {
        VizinhaLinkError::AuthenticationError(message) => {
            assert!(message.contains("Invalid login credentials"));
        }
        other => panic!("expected AuthenticationError, got {}", other),
    }

    let state = client.session().state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading, "failed sign-in settles the loading flag");
}

#[tokio::test]
async fn test_sign_in_against_hung_backend_times_out() {
    let server = StubServer::start(|_req| {
        StubReply::json(200, auth_session_body()).with_delay(Duration::from_secs(3))
    })
    .await;
    let client = client_for(&server);

    let started = Instant::now();
    let err = client
        .session()
        .sign_in("ana@example.com", "secret")
        .await
        .expect_err("a hung backend must not hang the sign-in");
    assert!(err.is_transient(), "expected a timeout-shaped error, got {}", err);
    assert!(started.elapsed() < Duration::from_millis(2800));
    assert!(!client.session().is_authenticated());
}

// =============================================================================
// Sign-up
// =============================================================================

#[tokio::test]
async fn test_sign_up_creates_the_profile_through_the_function() {
    let server = StubServer::start(|req| match (req.method.as_str(), req.route()) {
        ("POST", "/auth/v1/signup") => StubReply::json(200, auth_session_body()),
        ("POST", "/rest/v1/rpc/create_usuario_profile") => StubReply::json(
            200,
            r#"[{"usuario_id":"u-1","usuario_nome":"Ana Silva",
                 "usuario_email":"ana@example.com","usuario_perfil":"morador",
                 "usuario_verificado":false}]"#,
        ),
        _ => StubReply::json(404, r#"{"message":"unexpected request"}"#),
    })
    .await;
    let client = client_for(&server);

    client
        .session()
        .sign_up("ana@example.com", "secret", "Ana Silva", Perfil::Morador)
        .await
        .expect("sign-up should succeed");

    let state = client.session().state();
    assert!(state.is_authenticated);
    assert!(!state.is_verified, "new residents start unverified");
    assert_eq!(state.current_user.expect("profile").nome, "Ana Silva");
}

#[tokio::test]
async fn test_sign_up_falls_back_to_direct_insert_when_function_is_missing() {
    let server = StubServer::start(|req| match (req.method.as_str(), req.route()) {
        ("POST", "/auth/v1/signup") => StubReply::json(200, auth_session_body()),
        ("POST", "/rest/v1/rpc/create_usuario_profile") => StubReply::json(
            404,
            r#"{"message":"Could not find the function public.create_usuario_profile in the schema cache"}"#,
        ),
        ("POST", "/rest/v1/usuario") => StubReply::json(201, format!("[{}]", usuario_row(false))),
        _ => StubReply::json(404, r#"{"message":"unexpected request"}"#),
    })
    .await;
    let client = client_for(&server);

    client
        .session()
        .sign_up("ana@example.com", "secret", "Ana Silva", Perfil::Morador)
        .await
        .expect("the direct-insert fallback should cover a missing function");

    assert!(client.session().is_authenticated());

    let insert = server
        .requests()
        .into_iter()
        .find(|req| req.method == "POST" && req.route() == "/rest/v1/usuario")
        .expect("a direct insert was attempted");
    assert!(insert.body.contains(r#""id":"u-1""#));
    assert!(insert.body.contains(r#""nome":"Ana Silva""#));
}

// =============================================================================
// Sign-out and observation
// =============================================================================

#[tokio::test]
async fn test_sign_out_clears_state_and_stored_session() {
    let server = StubServer::start(happy_backend).await;
    let store = Arc::new(MemorySessionStore::new());
    store.save(&stored_session()).expect("seed store");
    let client = client_with_store(&server.base_url, store.clone());

    client.session().bootstrap().await;
    assert!(client.session().is_authenticated());

    client.session().sign_out().await;

    let state = client.session().state();
    assert!(!state.is_authenticated);
    assert!(state.current_user.is_none());
    assert_eq!(store.load().expect("store readable"), None);

    let logout_seen = server
        .requests()
        .iter()
        .any(|req| req.method == "POST" && req.route() == "/auth/v1/logout");
    assert!(logout_seen, "backend sign-out was attempted");
}

#[tokio::test]
async fn test_observers_see_one_consistent_authenticated_state() {
    let server = StubServer::start(happy_backend).await;
    let client = client_for(&server);
    let mut observer = client.session().subscribe();

    client
        .session()
        .sign_in("ana@example.com", "secret")
        .await
        .expect("sign-in should succeed");

    // Skip intermediate transitions; the settled state must be internally
    // consistent across all fields.
    let state = observer.borrow_and_update().clone();
    assert!(state.is_authenticated);
    assert!(!state.is_loading);
    assert!(
        state.current_user.is_some(),
        "authenticated state always carries the profile"
    );
}
