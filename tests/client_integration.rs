//! Integration tests for the HTTP client and auth flows against a local
//! mock backend.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use tourcraft_sdk::{
    CallOptions, Client, ClientSettings, Error, MemoryTokenStore, TimeoutClass, TimeoutClasses,
    TokenStore,
};

fn settings(base_url: &str) -> ClientSettings {
    ClientSettings::new(base_url)
}

fn client_with_store(base_url: &str, store: Arc<MemoryTokenStore>) -> Client {
    Client::builder(settings(base_url))
        .token_store(store)
        .build()
        .unwrap()
}

#[tokio::test]
async fn login_persists_token_on_success() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/tour-auth/login",
        post(|| async {
            Json(serde_json::json!({
                "token": "tok-123",
                "user": { "id": "u1", "username": "marco", "fullName": "Marco Polo", "email": "m@example.com" }
            }))
        }),
    );
    let base = common::serve(app).await;
    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with_store(&base, Arc::clone(&store));

    let response = client.auth().login("marco", "Venice1271").await?;
    assert_eq!(response.token.as_deref(), Some("tok-123"));
    assert_eq!(store.get(), Some("tok-123".to_string()));
    Ok(())
}

#[tokio::test]
async fn put_and_delete_round_trip() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/resource",
        axum::routing::put(|Json(body): Json<serde_json::Value>| async move {
            Json(serde_json::json!({ "stored": body }))
        })
        .delete(|| async { StatusCode::NO_CONTENT }),
    );
    let base = common::serve(app).await;
    let client = Client::new(settings(&base)).unwrap();

    let body: serde_json::Value = client
        .put("resource", &serde_json::json!({ "k": 1 }), CallOptions::default())
        .await?;
    assert_eq!(body["stored"]["k"], 1);

    client
        .delete::<()>("resource", CallOptions::default())
        .await?;
    Ok(())
}

#[tokio::test]
async fn failed_login_leaves_store_untouched_and_rewrites_message() {
    let app = Router::new().route(
        "/tour-auth/login",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "detail": "Invalid credentials" })),
            )
        }),
    );
    let base = common::serve(app).await;
    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with_store(&base, Arc::clone(&store));

    let err = client
        .auth()
        .login("marco", "WrongPass1")
        .await
        .unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Incorrect username or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn unauthorized_response_clears_token_and_fires_hook_once() {
    let app = Router::new().route(
        "/tour-auth/verify",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "detail": "Token expired" })),
            )
        }),
    );
    let base = common::serve(app).await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set("stale-token");

    let invalidations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&invalidations);
    let client = Client::builder(settings(&base))
        .token_store(Arc::clone(&store) as Arc<dyn TokenStore>)
        .on_session_invalidated(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let err = client
        .get::<serde_json::Value>("tour-auth/verify", CallOptions::authed())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionExpired { .. }));
    assert_eq!(store.get(), None);
    assert_eq!(invalidations.load(Ordering::SeqCst), 1);

    // A second 401 fires the hook again; one notification per response.
    let _ = client
        .get::<serde_json::Value>("tour-auth/verify", CallOptions::authed())
        .await
        .unwrap_err();
    assert_eq!(invalidations.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stale_401_does_not_clobber_newer_login_token() {
    // The 401 arrives for a request issued before a fresh token was
    // written; the generation guard must keep the new token.
    let app = Router::new().route(
        "/slow-verify",
        get(|State(store): State<Arc<MemoryTokenStore>>| async move {
            // Simulate a login landing while this request is in flight.
            tokio::time::sleep(Duration::from_millis(100)).await;
            store.set("fresh-token");
            StatusCode::UNAUTHORIZED
        }),
    );

    let store = Arc::new(MemoryTokenStore::new());
    store.set("old-token");
    let base = common::serve(app.with_state(Arc::clone(&store))).await;
    let client = client_with_store(&base, Arc::clone(&store));

    let err = client
        .get::<serde_json::Value>("slow-verify", CallOptions::authed())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionExpired { .. }));
    assert_eq!(store.get(), Some("fresh-token".to_string()));
}

#[tokio::test]
async fn bearer_header_is_attached_and_omitted_correctly() {
    async fn echo_auth(headers: HeaderMap) -> Json<serde_json::Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Json(serde_json::json!({ "auth": auth }))
    }
    let app = Router::new().route("/echo", get(echo_auth));
    let base = common::serve(app).await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with_store(&base, Arc::clone(&store));

    // No token stored: header omitted, the server decides.
    let body: serde_json::Value = client
        .get("echo", CallOptions::authed())
        .await
        .unwrap();
    assert_eq!(body["auth"], serde_json::Value::Null);

    store.set("tok-9");
    let body: serde_json::Value = client
        .get("echo", CallOptions::authed())
        .await
        .unwrap();
    assert_eq!(body["auth"], "Bearer tok-9");

    // Unauthenticated calls never attach it.
    let body: serde_json::Value = client
        .get("echo", CallOptions::default())
        .await
        .unwrap();
    assert_eq!(body["auth"], serde_json::Value::Null);
}

#[tokio::test]
async fn timeout_aborts_only_the_slow_call() {
    let app = Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(serde_json::json!({ "ok": true }))
            }),
        )
        .route("/fast", get(|| async { Json(serde_json::json!({ "ok": true })) }));
    let base = common::serve(app).await;

    let mut settings = settings(&base);
    settings.timeouts = TimeoutClasses {
        default: Duration::from_millis(300),
        generation: Duration::from_secs(10),
        research: Duration::from_secs(10),
    };
    let client = Client::new(settings).unwrap();

    // Same endpoint, two SLAs, issued concurrently: only the short one aborts.
    let (short, long) = tokio::join!(
        client.get::<serde_json::Value>("slow", CallOptions::default()),
        client.get::<serde_json::Value>(
            "slow",
            CallOptions::default().with_timeout(TimeoutClass::Generation)
        ),
    );

    assert!(matches!(short.unwrap_err(), Error::Network { .. }));
    assert_eq!(long.unwrap()["ok"], true);

    // The client remains usable after a timeout.
    let ok: serde_json::Value = client.get("fast", CallOptions::default()).await.unwrap();
    assert_eq!(ok["ok"], true);
}

#[tokio::test]
async fn undecodable_error_body_gets_synthetic_message() {
    let app = Router::new().route(
        "/broken",
        get(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream died</html>") }),
    );
    let base = common::serve(app).await;
    let client = Client::new(settings(&base)).unwrap();

    let err = client
        .get::<serde_json::Value>("broken", CallOptions::default())
        .await
        .unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "HTTP error 502");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn check_auth_status_fast_path_makes_no_network_call() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = Router::new().route(
        "/tour-auth/verify",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(serde_json::json!({ "id": "u1", "username": "marco" }))
            }
        }),
    );
    let base = common::serve(app).await;
    let client = Client::new(settings(&base)).unwrap();

    let status = client.auth().check_auth_status().await;
    assert!(!status.is_authenticated());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn check_auth_status_verifies_stored_token() {
    let app = Router::new().route(
        "/tour-auth/verify",
        get(|headers: HeaderMap| async move {
            if headers.get("authorization").is_some() {
                Json(serde_json::json!({
                    "id": "u1", "username": "marco", "fullName": "Marco Polo", "email": "m@example.com"
                }))
                .into_response()
            } else {
                StatusCode::UNAUTHORIZED.into_response()
            }
        }),
    );
    let base = common::serve(app).await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set("tok-1");
    let client = client_with_store(&base, Arc::clone(&store));

    let status = client.auth().check_auth_status().await;
    assert!(status.is_authenticated());
}

#[tokio::test]
async fn verification_failure_clears_token() {
    let app = Router::new().route(
        "/tour-auth/verify",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = common::serve(app).await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set("doomed");
    let client = client_with_store(&base, Arc::clone(&store));

    let status = client.auth().check_auth_status().await;
    assert!(!status.is_authenticated());
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn logout_clears_token_even_when_server_unreachable() {
    // Port 9 is discard; nothing is listening there.
    let store = Arc::new(MemoryTokenStore::new());
    store.set("tok-1");
    let client = client_with_store("http://127.0.0.1:9", Arc::clone(&store));

    client.auth().logout().await;
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn authed_generation_fails_fast_without_token() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = Router::new().route(
        "/tour-generation/generate",
        post(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(common::sample_tour_json("t1", "Paris"))
            }
        }),
    );
    let base = common::serve(app).await;
    let client = Client::new(settings(&base)).unwrap();

    let request = tourcraft_sdk::TourRequest {
        destination: "Paris".to_string(),
        duration: 4,
        interests: vec!["food".to_string()],
        travel_style: "Cultural".to_string(),
        budget: 100.0,
        group_size: 2,
    };
    let err = client.tours().generate(&request).await.unwrap_err();
    assert!(matches!(err, Error::AuthRequired));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
