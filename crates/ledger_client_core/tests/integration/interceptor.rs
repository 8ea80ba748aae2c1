//! Bearer attach and the single refresh-and-retry flow.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ledger_client_core::{ApiError, ApiRequest, ApiResponse, CredentialKey, CredentialStore, MemoryCredentialStore};
use pretty_assertions::assert_eq;
use reqwest::Method;

use crate::common::{client, ok, status, unauthorized, FakeTransport, BASE_URL};

fn store(access: Option<&str>, refresh: Option<&str>) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_tokens(access, refresh))
}

#[tokio::test]
async fn request_without_token_has_no_authorization() {
    let c = client(FakeTransport::scripted(vec![ok(serde_json::json!({}))]), store(None, None));
    c.execute(ApiRequest::get("/accounts/")).await.unwrap();

    let sent = c.transport().requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bearer, None);
    assert_eq!(sent[0].authorization_header(), None);
}

#[tokio::test]
async fn request_with_token_sends_bearer_verbatim() {
    let c = client(
        FakeTransport::scripted(vec![ok(serde_json::json!({}))]),
        store(Some("eyJ.access.token"), None),
    );
    c.execute(ApiRequest::get("/accounts/")).await.unwrap();

    let sent = c.transport().requests();
    assert_eq!(sent[0].authorization_header().as_deref(), Some("Bearer eyJ.access.token"));
    assert_eq!(sent[0].url, format!("{}/accounts/", BASE_URL));
}

#[tokio::test]
async fn unauthorized_refreshes_once_and_replays_with_new_token() {
    let tokens = store(Some("stale"), Some("r1"));
    let c = client(
        FakeTransport::scripted(vec![
            unauthorized(),
            ok(serde_json::json!({"access": "fresh"})),
            ok(serde_json::json!({"ok": true})),
        ]),
        tokens.clone(),
    );

    let response = c
        .execute(ApiRequest::post("/transactions/").with_json(serde_json::json!({"reference": "INV-001"})))
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let sent = c.transport().requests();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].bearer.as_deref(), Some("stale"));

    let refresh = &sent[1];
    assert_eq!(refresh.method, Method::POST);
    assert_eq!(refresh.url, format!("{}/auth/refresh/", BASE_URL));
    assert_eq!(refresh.bearer, None);
    assert_eq!(refresh.body, Some(serde_json::json!({"refresh": "r1"})));

    assert_eq!(sent[2].bearer.as_deref(), Some("fresh"));
    assert_eq!(sent[2].url, sent[0].url);
    assert_eq!(sent[2].body, sent[0].body);

    assert_eq!(tokens.get(CredentialKey::AccessToken).unwrap().as_deref(), Some("fresh"));
    assert_eq!(tokens.get(CredentialKey::RefreshToken).unwrap().as_deref(), Some("r1"));
}

#[tokio::test]
async fn second_unauthorized_after_replay_is_returned_without_another_refresh() {
    let c = client(
        FakeTransport::scripted(vec![
            unauthorized(),
            ok(serde_json::json!({"access": "fresh"})),
            status(401, serde_json::json!({"detail": "still no"})),
        ]),
        store(Some("stale"), Some("r1")),
    );

    let err = c.execute(ApiRequest::get("/accounts/")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.server_message().as_deref(), Some("still no"));
    assert_eq!(c.transport().requests().len(), 3);
    assert_eq!(c.transport().count_to("/auth/refresh/"), 1);
}

#[tokio::test]
async fn missing_refresh_token_surfaces_original_error() {
    let tokens = store(Some("stale"), None);
    let original = r#"{"detail":"Given token not valid for any token type"}"#;
    let c = client(
        FakeTransport::scripted(vec![Ok(ApiResponse::new(401, original))]),
        tokens.clone(),
    );

    let err = c.execute(ApiRequest::get("/accounts/")).await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, original);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(c.transport().requests().len(), 1);
    assert_eq!(c.transport().count_to("/auth/refresh/"), 0);
    assert_eq!(tokens.get(CredentialKey::AccessToken).unwrap().as_deref(), Some("stale"));
}

#[tokio::test]
async fn failed_refresh_clears_credentials_and_fires_hook() {
    let tokens = store(Some("stale"), Some("expired-refresh"));
    let expired = Arc::new(AtomicUsize::new(0));
    let counter = expired.clone();
    let c = client(
        FakeTransport::scripted(vec![
            unauthorized(),
            status(401, serde_json::json!({"detail": "Token is invalid or expired"})),
        ]),
        tokens.clone(),
    )
    .on_session_expired(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let err = c.execute(ApiRequest::get("/accounts/")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(
        err.server_message().as_deref(),
        Some("Given token not valid for any token type")
    );
    assert_eq!(c.transport().requests().len(), 2);
    assert_eq!(expired.load(Ordering::SeqCst), 1);
    assert_eq!(tokens.get(CredentialKey::AccessToken).unwrap(), None);
    assert_eq!(tokens.get(CredentialKey::RefreshToken).unwrap(), None);
}

#[tokio::test]
async fn refresh_transport_failure_also_expires_session() {
    let tokens = store(Some("stale"), Some("r1"));
    let c = client(
        FakeTransport::scripted(vec![
            unauthorized(),
            Err(ApiError::Transport("connection reset".into())),
        ]),
        tokens.clone(),
    );

    let err = c.execute(ApiRequest::get("/accounts/")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(tokens.get(CredentialKey::RefreshToken).unwrap(), None);
}

#[tokio::test]
async fn other_failures_pass_through_unchanged() {
    let c = client(
        FakeTransport::scripted(vec![
            status(500, serde_json::json!({"error": "boom"})),
            Err(ApiError::Transport("connection refused".into())),
        ]),
        store(Some("tok"), Some("r1")),
    );

    let err = c.execute(ApiRequest::get("/accounts/")).await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let err = c.execute(ApiRequest::get("/accounts/")).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));

    assert_eq!(c.transport().count_to("/auth/refresh/"), 0);
}

#[tokio::test]
async fn concurrent_unauthorized_requests_each_refresh() {
    let c = client(
        FakeTransport::with_handler(|req| {
            if req.url.ends_with("/auth/refresh/") {
                return ok(serde_json::json!({"access": "fresh"}));
            }
            match req.bearer.as_deref() {
                Some("fresh") => ok(serde_json::json!({"ok": true})),
                _ => unauthorized(),
            }
        }),
        store(Some("stale"), Some("r1")),
    );

    let (a, b) = tokio::join!(
        c.execute(ApiRequest::get("/accounts/")),
        c.execute(ApiRequest::get("/transactions/")),
    );
    assert!(a.is_ok());
    assert!(b.is_ok());
    // Both were sent with the stale token, so both refreshed independently.
    assert_eq!(c.transport().count_to("/auth/refresh/"), 2);
    let stale_sends = c
        .transport()
        .requests()
        .iter()
        .filter(|r| r.bearer.as_deref() == Some("stale"))
        .count();
    assert_eq!(stale_sends, 2);
}
