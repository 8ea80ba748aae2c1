//! Endpoint wrappers: paths, methods, bodies and response unwrapping.

use std::sync::Arc;

use ledger_client_core::{
    AccountPatch, AccountQuery, AccountType, CredentialKey, CredentialStore, EntryType, MemoryCredentialStore,
    NewEntry, NewTransaction, TransactionQuery, TransactionStatus,
};
use pretty_assertions::assert_eq;
use reqwest::Method;
use rust_decimal::Decimal;

use crate::common::{account_json, client, date, ok, page, status, FakeTransport, BASE_URL};

fn logged_in() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_tokens(Some("tok"), Some("r1")))
}

fn transaction_json(id: &str, reference: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "reference": reference,
        "date": "2025-03-14",
        "description": "Office supplies",
        "status": status,
        "total_amount": "120.50",
        "entries": [
            {"id": "e1", "account": "a-exp", "account_code": "6100", "account_name": "Supplies",
             "entry_type": "debit", "amount": "120.50", "description": ""},
            {"id": "e2", "account": "a-cash", "account_code": "1000", "account_name": "Cash",
             "entry_type": "credit", "amount": "120.50", "description": ""}
        ],
        "created_by_username": "admin",
        "posted_by_username": null,
        "created_at": "2025-03-14T09:00:00Z",
        "updated_at": "2025-03-14T09:00:00Z",
        "posted_at": null
    })
}

#[tokio::test]
async fn list_accounts_unwraps_first_page_and_sends_filters() {
    let c = client(
        FakeTransport::scripted(vec![ok(page(serde_json::json!([
            account_json("a1", "1000", "Cash", "asset", "25000.00"),
            account_json("a2", "2000", "Accounts Payable", "liability", "8000"),
        ])))]),
        logged_in(),
    );

    let query = AccountQuery {
        search: Some("ca".into()),
        account_type: Some(AccountType::Asset),
        ordering: None,
    };
    let accounts = c.list_accounts(&query).await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].balance, Decimal::new(2_500_000, 2));
    assert_eq!(accounts[1].account_type, AccountType::Liability);

    let sent = &c.transport().requests()[0];
    assert_eq!(sent.method, Method::GET);
    assert_eq!(sent.url, format!("{}/accounts/", BASE_URL));
    assert_eq!(
        sent.query,
        vec![
            ("search".to_string(), "ca".to_string()),
            ("account_type".to_string(), "asset".to_string()),
        ]
    );
}

#[tokio::test]
async fn detail_paths_percent_encode_ids() {
    let c = client(
        FakeTransport::scripted(vec![ok(account_json("a/1", "1000", "Cash", "asset", "0"))]),
        logged_in(),
    );
    let account = c.get_account("a/1").await.unwrap();
    assert_eq!(account.id, "a/1");
    assert_eq!(c.transport().requests()[0].url, format!("{}/accounts/a%2F1/", BASE_URL));
}

#[tokio::test]
async fn update_account_sends_only_changed_fields() {
    let c = client(
        FakeTransport::scripted(vec![ok(account_json("a1", "1000", "Petty Cash", "asset", "0"))]),
        logged_in(),
    );
    let patch = AccountPatch {
        name: Some("Petty Cash".into()),
        ..Default::default()
    };
    let updated = c.update_account("a1", &patch).await.unwrap();
    assert_eq!(updated.name, "Petty Cash");

    let sent = &c.transport().requests()[0];
    assert_eq!(sent.method, Method::PATCH);
    assert_eq!(sent.body, Some(serde_json::json!({"name": "Petty Cash"})));
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let c = client(FakeTransport::scripted(vec![status(204, serde_json::Value::Null)]), logged_in());
    c.delete_account("a1").await.unwrap();
    let sent = &c.transport().requests()[0];
    assert_eq!(sent.method, Method::DELETE);
    assert_eq!(sent.url, format!("{}/accounts/a1/", BASE_URL));
}

#[tokio::test]
async fn accounts_by_type_decodes_grouping() {
    let c = client(
        FakeTransport::scripted(vec![ok(serde_json::json!({
            "asset": [account_json("a1", "1000", "Cash", "asset", "10")],
            "expense": [],
        }))]),
        logged_in(),
    );
    let grouped = c.accounts_by_type().await.unwrap();
    assert_eq!(grouped[&AccountType::Asset].len(), 1);
    assert!(grouped[&AccountType::Expense].is_empty());
    assert_eq!(c.transport().requests()[0].url, format!("{}/accounts/by_type/", BASE_URL));
}

#[tokio::test]
async fn list_transactions_decodes_entries() {
    let c = client(
        FakeTransport::scripted(vec![ok(page(serde_json::json!([transaction_json("t1", "INV-001", "pending")])))]),
        logged_in(),
    );
    let query = TransactionQuery {
        status: Some(TransactionStatus::Pending),
        date: Some(date(2025, 3, 14)),
        ..Default::default()
    };
    let list = c.list_transactions(&query).await.unwrap();
    assert_eq!(list.len(), 1);
    let t = &list[0];
    assert_eq!(t.status, TransactionStatus::Pending);
    assert!(t.is_balanced());
    assert_eq!(t.account_codes(EntryType::Debit), vec!["6100"]);

    let sent = &c.transport().requests()[0];
    assert_eq!(
        sent.query,
        vec![
            ("status".to_string(), "pending".to_string()),
            ("date".to_string(), "2025-03-14".to_string()),
        ]
    );
}

#[tokio::test]
async fn create_transaction_serializes_amounts_as_strings() {
    let c = client(
        FakeTransport::scripted(vec![status(201, transaction_json("t9", "INV-009", "draft"))]),
        logged_in(),
    );
    let new = NewTransaction {
        reference: "INV-009".into(),
        date: date(2025, 3, 14),
        description: "Office supplies".into(),
        status: None,
        total_amount: Decimal::new(12050, 2),
        entries: vec![NewEntry {
            account: "a-exp".into(),
            entry_type: EntryType::Debit,
            amount: Decimal::new(12050, 2),
            description: String::new(),
        }],
    };
    let created = c.create_transaction(&new).await.unwrap();
    assert_eq!(created.id, "t9");

    let body = c.transport().requests()[0].body.clone().unwrap();
    assert_eq!(body["total_amount"], "120.50");
    assert_eq!(body["date"], "2025-03-14");
    assert_eq!(body["entries"][0]["entry_type"], "debit");
    assert!(body.get("status").is_none());
}

#[tokio::test]
async fn post_and_cancel_hit_action_paths() {
    let c = client(
        FakeTransport::scripted(vec![
            ok(serde_json::json!({"status": "Transaction posted successfully"})),
            ok(serde_json::json!({"status": "Transaction cancelled successfully"})),
        ]),
        logged_in(),
    );
    c.post_transaction("t1").await.unwrap();
    c.cancel_transaction("t2").await.unwrap();

    let sent = c.transport().requests();
    assert_eq!(sent[0].method, Method::POST);
    assert_eq!(sent[0].url, format!("{}/transactions/t1/post_transaction/", BASE_URL));
    assert_eq!(sent[1].url, format!("{}/transactions/t2/cancel_transaction/", BASE_URL));
}

#[tokio::test]
async fn post_rejection_carries_server_message() {
    let c = client(
        FakeTransport::scripted(vec![status(
            400,
            serde_json::json!({"error": "Only pending transactions can be posted"}),
        )]),
        logged_in(),
    );
    let err = c.post_transaction("t1").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.server_message().as_deref(), Some("Only pending transactions can be posted"));
}

#[tokio::test]
async fn dashboard_metrics_reads_server_totals() {
    let c = client(
        FakeTransport::scripted(vec![ok(serde_json::json!({
            "total_assets": "40000.00",
            "total_liabilities": "8000.00",
            "total_equity": "0",
            "total_revenues": "1500",
            "total_expenses": "500",
            "net_income": "1000",
            "recent_transactions": 3
        }))]),
        logged_in(),
    );
    let metrics = c.dashboard_metrics().await.unwrap();
    assert_eq!(metrics.total_assets, Decimal::from(40_000));
    assert_eq!(metrics.net_income, Decimal::from(1_000));
    assert_eq!(metrics.recent_transactions, 3);
}

#[tokio::test]
async fn login_stores_both_tokens_and_logout_clears_them() {
    let store = Arc::new(MemoryCredentialStore::new());
    let c = client(
        FakeTransport::scripted(vec![ok(serde_json::json!({"access": "a1", "refresh": "r1"}))]),
        store.clone(),
    );
    assert!(!c.is_logged_in().unwrap());

    c.login("admin", "secret").await.unwrap();
    let sent = &c.transport().requests()[0];
    assert_eq!(sent.url, format!("{}/auth/login/", BASE_URL));
    assert_eq!(sent.body, Some(serde_json::json!({"username": "admin", "password": "secret"})));
    assert_eq!(store.get(CredentialKey::AccessToken).unwrap().as_deref(), Some("a1"));
    assert_eq!(store.get(CredentialKey::RefreshToken).unwrap().as_deref(), Some("r1"));
    assert!(c.is_logged_in().unwrap());

    c.logout().unwrap();
    assert!(!c.is_logged_in().unwrap());
    assert_eq!(store.get(CredentialKey::RefreshToken).unwrap(), None);
}

#[tokio::test]
async fn failed_login_leaves_store_empty() {
    let store = Arc::new(MemoryCredentialStore::new());
    let c = client(
        FakeTransport::scripted(vec![status(401, serde_json::json!({"error": "Invalid credentials"}))]),
        store.clone(),
    );
    let err = c.login("admin", "wrong").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);
}
