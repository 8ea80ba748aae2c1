//! ReqwestTransport against a local axum server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use ledger_client_core::{
    AccountQuery, AccountType, ApiClient, ClientConfig, CredentialKey, CredentialStore, MemoryCredentialStore,
};
use pretty_assertions::assert_eq;

use crate::common::account_json;

#[derive(Clone, Default)]
struct Server {
    refreshes: Arc<AtomicUsize>,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn list_accounts(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if bearer(&headers) != Some("fresh") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"detail": "Given token not valid for any token type"})),
        );
    }
    let name = params.get("search").cloned().unwrap_or_else(|| "Cash".into());
    let account_type = params.get("account_type").cloned().unwrap_or_else(|| "asset".into());
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [account_json("a1", "1000", &name, &account_type, "40000.00")]
        })),
    )
}

async fn refresh(
    State(server): State<Server>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    server.refreshes.fetch_add(1, Ordering::SeqCst);
    if headers.contains_key("authorization") {
        return (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": "unexpected bearer"})));
    }
    match body["refresh"].as_str() {
        Some("r1") => (StatusCode::OK, Json(serde_json::json!({"access": "fresh"}))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"detail": "Token is invalid or expired"})),
        ),
    }
}

async fn spawn_server(server: Server) -> String {
    let app = Router::new()
        .route("/api/accounts/", get(list_accounts))
        .route("/api/auth/refresh/", post(refresh))
        .with_state(server);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

#[tokio::test]
async fn refresh_and_replay_over_http() {
    let server = Server::default();
    let base = spawn_server(server.clone()).await;
    let store = Arc::new(MemoryCredentialStore::with_tokens(Some("stale"), Some("r1")));
    let client = ApiClient::with_reqwest(ClientConfig::new(base), store.clone()).unwrap();

    let query = AccountQuery {
        search: Some("Petty Cash".into()),
        account_type: Some(AccountType::Asset),
        ordering: None,
    };
    let accounts = client.list_accounts(&query).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Petty Cash");
    assert_eq!(server.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(store.get(CredentialKey::AccessToken).unwrap().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn rejected_refresh_over_http_clears_store() {
    let server = Server::default();
    let base = spawn_server(server.clone()).await;
    let store = Arc::new(MemoryCredentialStore::with_tokens(Some("stale"), Some("revoked")));
    let client = ApiClient::with_reqwest(ClientConfig::new(base), store.clone()).unwrap();

    let err = client.list_accounts(&AccountQuery::default()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(
        err.server_message().as_deref(),
        Some("Given token not valid for any token type")
    );
    assert_eq!(server.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);
    assert_eq!(store.get(CredentialKey::RefreshToken).unwrap(), None);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = Arc::new(MemoryCredentialStore::new());
    let client = ApiClient::with_reqwest(ClientConfig::new(format!("http://{}/api", addr)), store).unwrap();
    let err = client.list_accounts(&AccountQuery::default()).await.unwrap_err();
    assert!(matches!(err, ledger_client_core::ApiError::Transport(_)));
}
