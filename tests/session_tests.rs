// SPDX-License-Identifier: MIT

//! Session lifecycle tests: persisted-session restore, deep-link token
//! exchange, and auth-state broadcasting.
//!
//! The auth client points at a closed local port, so any test that would
//! hit the network fails fast; everything exercised here must resolve
//! locally (claims decoding, fragment parsing, storage).

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use repday::models::{AuthUser, Session};
use repday::services::{AuthClient, AuthState, SessionStore};
use repday::storage::SessionStorage;
use serde::Serialize;

/// Nothing listens here; requests fail with a connection error.
const DEAD_SUPABASE_URL: &str = "http://127.0.0.1:9";

fn make_store(dir: &tempfile::TempDir) -> SessionStore {
    let auth = AuthClient::new(DEAD_SUPABASE_URL, "anon");
    let storage = SessionStorage::new(dir.path().join("session.json"));
    SessionStore::new(auth, storage)
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    email: Option<String>,
    exp: i64,
}

/// An access token whose claims decode without any network round-trip.
fn make_access_token(sub: &str, email: &str, exp_in: Duration) -> String {
    let claims = TestClaims {
        sub: sub.to_string(),
        email: Some(email.to_string()),
        exp: (Utc::now() + exp_in).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"unverified"),
    )
    .unwrap()
}

fn make_session(expires_in: Duration) -> Session {
    Session {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: Utc::now() + expires_in,
        user: AuthUser {
            id: "user-1".to_string(),
            email: Some("jamie@example.com".to_string()),
        },
    }
}

#[tokio::test]
async fn test_initialize_without_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = make_store(&dir);

    assert!(store.is_loading());
    store.initialize().await;
    assert!(!store.is_loading());
    assert!(store.session().is_none());
}

#[tokio::test]
async fn test_initialize_restores_valid_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SessionStorage::new(dir.path().join("session.json"));
    let persisted = make_session(Duration::hours(1));
    storage.save(&persisted).await.unwrap();

    let store = make_store(&dir);
    store.initialize().await;

    let session = store.session().expect("session restored");
    assert_eq!(session.user.id, "user-1");
    assert_eq!(session.display_name(), "Jamie");
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_initialize_clears_expired_session_when_refresh_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let storage = SessionStorage::new(&path);
    storage.save(&make_session(-Duration::hours(1))).await.unwrap();

    // Refresh cannot reach the auth service; the session is dropped
    let store = make_store(&dir);
    store.initialize().await;

    assert!(store.session().is_none());
    assert!(!store.is_loading());
    assert!(storage.load().await.is_none(), "persisted copy cleared");
}

#[tokio::test]
async fn test_deep_link_sets_session_from_fragment_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let store = make_store(&dir);
    store.initialize().await;

    let token = make_access_token("user-9", "pat@example.com", Duration::hours(1));
    let url = format!("repday://callback#access_token={token}&refresh_token=R");
    store.handle_deep_link(&url).await;

    let session = store.session().expect("session set from deep link");
    assert_eq!(session.user.id, "user-9");
    assert_eq!(session.user.email.as_deref(), Some("pat@example.com"));
    assert_eq!(session.access_token, token);
    assert_eq!(session.refresh_token, "R");

    // And it was persisted
    let storage = SessionStorage::new(dir.path().join("session.json"));
    assert_eq!(storage.load().await, Some(session));
}

#[tokio::test]
async fn test_deep_link_without_tokens_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store = make_store(&dir);
    store.initialize().await;

    for url in [
        "repday://callback",
        "repday://callback#other=param",
        "repday://callback#access_token=only",
        "https://example.com/?access_token=A&refresh_token=B",
    ] {
        store.handle_deep_link(url).await;
        assert!(store.session().is_none(), "url: {url}");
    }
}

#[tokio::test]
async fn test_failed_deep_link_exchange_keeps_current_session() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SessionStorage::new(dir.path().join("session.json"));
    let current = make_session(Duration::hours(1));
    storage.save(&current).await.unwrap();

    let store = make_store(&dir);
    store.initialize().await;

    // Garbage access token: the exchange fails, non-fatally
    store
        .handle_deep_link("repday://callback#access_token=garbage&refresh_token=R")
        .await;

    assert_eq!(store.session(), Some(current));
}

#[tokio::test]
async fn test_sign_out_clears_session_even_when_remote_fails() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SessionStorage::new(dir.path().join("session.json"));
    storage.save(&make_session(Duration::hours(1))).await.unwrap();

    let store = make_store(&dir);
    store.initialize().await;
    assert!(store.session().is_some());

    // Remote revocation can't reach the service; local state clears anyway
    store.sign_out().await;
    assert!(store.session().is_none());
    assert!(storage.load().await.is_none());
}

#[tokio::test]
async fn test_auth_state_changes_are_broadcast() {
    let dir = tempfile::tempdir().unwrap();
    let store = make_store(&dir);
    let mut rx = store.subscribe();
    assert_eq!(*rx.borrow(), AuthState::Loading);

    store.initialize().await;
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), AuthState::Unauthenticated);

    let token = make_access_token("user-9", "pat@example.com", Duration::hours(1));
    store
        .handle_deep_link(&format!(
            "repday://callback#access_token={token}&refresh_token=R"
        ))
        .await;
    rx.changed().await.unwrap();
    assert!(matches!(
        &*rx.borrow_and_update(),
        AuthState::Authenticated(s) if s.user.id == "user-9"
    ));
}
