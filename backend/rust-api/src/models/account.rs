use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::Row;
use uuid::Uuid;

use super::{decode_column, AccountType};
use crate::services::ledger;

#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub parent_account: Option<Uuid>,
    pub parent_account_name: Option<String>,
    pub is_active: bool,
    pub description: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for AccountResponse {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        let account_type: AccountType = decode_column(row, "account_type")?;
        let debit_total: Decimal = row.try_get("debit_total")?;
        let credit_total: Decimal = row.try_get("credit_total")?;
        Ok(Self {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            account_type,
            parent_account: row.try_get("parent_account_id")?,
            parent_account_name: row.try_get("parent_account_name")?,
            is_active: row.try_get("is_active")?,
            description: row.try_get("description")?,
            balance: ledger::signed_balance(account_type, debit_total, credit_total),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountListQuery {
    pub search: Option<String>,
    pub account_type: Option<String>,
    pub parent_account: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<i64>,
}

/// Whitelisted `ORDER BY` for account lists; unknown fields fall back to code.
pub fn account_order_clause(ordering: Option<&str>) -> &'static str {
    match ordering.map(str::trim) {
        Some("name") => "a.name ASC, a.code ASC",
        Some("-name") => "a.name DESC, a.code ASC",
        Some("created_at") => "a.created_at ASC, a.code ASC",
        Some("-created_at") => "a.created_at DESC, a.code ASC",
        Some("-code") => "a.code DESC",
        _ => "a.code ASC",
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub parent_account: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub description: String,
}

fn default_true() -> bool {
    true
}

/// PATCH body. `parent_account: null` clears the parent, an absent key keeps it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    #[serde(default, deserialize_with = "present")]
    pub parent_account: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
