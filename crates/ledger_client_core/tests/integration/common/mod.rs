//! Shared fixtures: scripted transport and model builders.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Utc};
use ledger_client_core::{
    Account, AccountType, ApiClient, ApiError, ApiResponse, ClientConfig, MemoryCredentialStore, PreparedRequest,
    Transaction, TransactionStatus, Transport,
};
use rust_decimal::Decimal;

pub const BASE_URL: &str = "http://api.test/api";

type Handler = Box<dyn Fn(&PreparedRequest) -> Result<ApiResponse, ApiError> + Send + Sync>;

/// Transport that records every request and answers through a handler.
pub struct FakeTransport {
    handler: Handler,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl FakeTransport {
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&PreparedRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers in order; an exhausted script yields a 599.
    pub fn scripted(responses: Vec<Result<ApiResponse, ApiError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::with_handler(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::new(599, "no scripted response")))
        })
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_to(&self, url_suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.ends_with(url_suffix))
            .count()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError> {
        // Suspend once so joined requests interleave like real network calls.
        tokio::task::yield_now().await;
        let response = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub type TestClient = ApiClient<FakeTransport, Arc<MemoryCredentialStore>>;

pub fn client(transport: FakeTransport, store: Arc<MemoryCredentialStore>) -> TestClient {
    ApiClient::new(ClientConfig::new(BASE_URL), transport, store)
}

pub fn ok(body: serde_json::Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::new(200, body.to_string()))
}

pub fn status(code: u16, body: serde_json::Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::new(code, body.to_string()))
}

pub fn unauthorized() -> Result<ApiResponse, ApiError> {
    status(401, serde_json::json!({"detail": "Given token not valid for any token type"}))
}

pub fn page(results: serde_json::Value) -> serde_json::Value {
    let count = results.as_array().map(|a| a.len()).unwrap_or(0);
    serde_json::json!({ "count": count, "next": null, "previous": null, "results": results })
}

pub fn account(id: &str, code: &str, name: &str, account_type: AccountType, balance: i64) -> Account {
    let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    Account {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        account_type,
        parent_account: None,
        parent_account_name: None,
        is_active: true,
        description: String::new(),
        balance: Decimal::from(balance),
        created_at: ts,
        updated_at: ts,
    }
}

pub fn transaction(
    id: &str,
    reference: &str,
    description: &str,
    status: TransactionStatus,
    date: NaiveDate,
    amount: i64,
) -> Transaction {
    let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    Transaction {
        id: id.to_string(),
        reference: reference.to_string(),
        date,
        description: description.to_string(),
        status,
        total_amount: Decimal::from(amount),
        entries: Vec::new(),
        created_by_username: None,
        posted_by_username: None,
        created_at: ts,
        updated_at: ts,
        posted_at: None,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn account_json(id: &str, code: &str, name: &str, account_type: &str, balance: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "code": code,
        "name": name,
        "account_type": account_type,
        "parent_account": null,
        "parent_account_name": null,
        "is_active": true,
        "description": "",
        "balance": balance,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}
