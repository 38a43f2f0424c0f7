//! Integration tests for `HttpGateway` against a fake identity service.
//!
//! The fake speaks the same endpoints and error bodies as a Supabase
//! project and records what it receives.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use mindful_onboarding::auth::{AccountId, HttpGateway, IdentityGateway};
use mindful_onboarding::config::GatewayConfig;
use mindful_onboarding::error::GatewayError;
use mindful_onboarding::onboarding::{AccountMetadata, ProfileRecord};

const ANON_KEY: &str = "anon-test-key";

#[derive(Default)]
struct Recorded {
    sign_ups: Vec<Value>,
    profiles: Vec<(String, Value)>,
    api_keys: Vec<String>,
}

#[derive(Clone, Default)]
struct FakeState {
    recorded: Arc<Mutex<Recorded>>,
}

async fn sign_up(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut recorded = state.recorded.lock().await;
    if let Some(key) = headers.get("apikey").and_then(|v| v.to_str().ok()) {
        recorded.api_keys.push(key.to_string());
    }
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"code": 422, "error_code": "user_already_exists", "msg": "User already registered"})),
        );
    }
    recorded.sign_ups.push(body);
    (
        StatusCode::OK,
        Json(json!({"id": "11111111-2222-3333-4444-555555555555", "email": "alice@example.com"})),
    )
}

async fn token(
    Query(params): Query<std::collections::HashMap<String, String>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if params.get("grant_type").map(String::as_str) != Some("password") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        );
    }
    if body["password"] != "123456" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Invalid login credentials"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "access_token": "jwt-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "refresh_token": "refresh",
            "user": {"id": "11111111-2222-3333-4444-555555555555"}
        })),
    )
}

async fn insert_row(
    State(state): State<FakeState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if table != "profiles" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"code": "42P01", "message": format!("relation \"public.{table}\" does not exist")})),
        )
            .into_response();
    }
    assert_eq!(
        headers.get("prefer").and_then(|v| v.to_str().ok()),
        Some("return=minimal")
    );
    state.recorded.lock().await.profiles.push((table, body));
    StatusCode::CREATED.into_response()
}

async fn start_fake() -> (String, FakeState) {
    let state = FakeState::default();
    let app = Router::new()
        .route("/auth/v1/signup", post(sign_up))
        .route("/auth/v1/token", post(token))
        .route("/rest/v1/{table}", post(insert_row))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}"), state)
}

fn gateway(base_url: &str) -> HttpGateway {
    let mut config = GatewayConfig::new(base_url, ANON_KEY);
    config.timeout = Duration::from_secs(5);
    HttpGateway::new(config).unwrap()
}

fn metadata() -> AccountMetadata {
    AccountMetadata {
        full_name: "Alice Doe".to_string(),
        symptom_ids: vec!["anxiety".to_string(), "stress".to_string()],
    }
}

#[tokio::test]
async fn sign_up_sends_metadata_and_returns_id() {
    let (base, fake) = start_fake().await;
    let gateway = gateway(&base);

    let id = gateway
        .create_account("alice@example.com", "123456", &metadata())
        .await
        .unwrap();
    assert_eq!(id.as_str(), "11111111-2222-3333-4444-555555555555");

    let recorded = fake.recorded.lock().await;
    assert_eq!(recorded.api_keys, vec![ANON_KEY]);
    let body = &recorded.sign_ups[0];
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["data"]["full_name"], "Alice Doe");
    assert_eq!(body["data"]["symptoms"], json!(["anxiety", "stress"]));
}

#[tokio::test]
async fn sign_up_rejection_carries_service_message() {
    let (base, _fake) = start_fake().await;
    let err = gateway(&base)
        .create_account("taken@example.com", "123456", &metadata())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Rejected { .. }));
    assert_eq!(err.to_string(), "User already registered");
}

#[tokio::test]
async fn sign_in_returns_session() {
    let (base, _fake) = start_fake().await;
    let gateway = gateway(&base);

    let session = gateway
        .verify_credentials("alice@example.com", "123456")
        .await
        .unwrap();
    assert_eq!(session.account_id.as_str(), "11111111-2222-3333-4444-555555555555");
    assert_eq!(session.access_token.expose_secret(), "jwt-token");
    assert_eq!(session.expires_at.unwrap().timestamp(), 1_900_000_000);

    let err = gateway
        .verify_credentials("alice@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid login credentials");
}

#[tokio::test]
async fn profile_row_is_inserted() {
    let (base, fake) = start_fake().await;
    let account_id = AccountId("11111111-2222-3333-4444-555555555555".to_string());
    let profile = ProfileRecord::from(metadata());

    gateway(&base)
        .persist_profile(&account_id, &profile)
        .await
        .unwrap();

    let recorded = fake.recorded.lock().await;
    let (table, rows) = &recorded.profiles[0];
    assert_eq!(table, "profiles");
    assert_eq!(rows[0]["id"], account_id.as_str());
    assert_eq!(rows[0]["full_name"], "Alice Doe");
    assert_eq!(rows[0]["symptoms"], json!(["anxiety", "stress"]));
}

#[tokio::test]
async fn profile_error_uses_rest_message() {
    let (base, _fake) = start_fake().await;
    let mut config = GatewayConfig::new(&base, ANON_KEY);
    config.profiles_table = "missing".to_string();
    let gateway = HttpGateway::new(config).unwrap();

    let err = gateway
        .persist_profile(&AccountId("x".to_string()), &ProfileRecord::from(metadata()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "relation \"public.missing\" does not exist");
}

#[tokio::test]
async fn unreachable_service_is_http_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = gateway(&format!("http://127.0.0.1:{port}"))
        .verify_credentials("alice@example.com", "123456")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Http(_)));
}
