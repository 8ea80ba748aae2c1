use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use super::{decode_column, EntryType, TransactionStatus};

#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    #[serde(skip)]
    pub transaction_id: Uuid,
    pub account: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub description: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for EntryResponse {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            transaction_id: row.try_get("transaction_id")?,
            account: row.try_get("account_id")?,
            account_code: row.try_get("account_code")?,
            account_name: row.try_get("account_name")?,
            entry_type: decode_column(row, "entry_type")?,
            amount: row.try_get("amount")?,
            description: row.try_get("description")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub reference: String,
    pub date: NaiveDate,
    pub description: String,
    pub status: TransactionStatus,
    pub total_amount: Decimal,
    pub entries: Vec<EntryResponse>,
    pub created_by_username: Option<String>,
    pub posted_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for TransactionResponse {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            reference: row.try_get("reference")?,
            date: row.try_get("date")?,
            description: row.try_get("description")?,
            status: decode_column(row, "status")?,
            total_amount: row.try_get("total_amount")?,
            entries: Vec::new(),
            created_by_username: row.try_get("created_by_username")?,
            posted_by_username: row.try_get("posted_by_username")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            posted_at: row.try_get("posted_at")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::date::deserialize_opt")]
    pub date: Option<NaiveDate>,
    pub ordering: Option<String>,
    pub page: Option<i64>,
}

/// Whitelisted `ORDER BY` for transaction lists; default is newest first.
pub fn transaction_order_clause(ordering: Option<&str>) -> &'static str {
    match ordering.map(str::trim) {
        Some("date") => "t.date ASC, t.created_at ASC",
        Some("reference") => "t.reference ASC",
        Some("-reference") => "t.reference DESC",
        Some("created_at") => "t.created_at ASC",
        Some("-created_at") => "t.created_at DESC",
        _ => "t.date DESC, t.created_at DESC",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryRequest {
    pub account: Uuid,
    pub entry_type: EntryType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub reference: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub status: Option<TransactionStatus>,
    pub total_amount: Decimal,
    pub entries: Vec<EntryRequest>,
}

/// PATCH body. When `entries` is present it replaces every existing entry.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    pub reference: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<TransactionStatus>,
    pub total_amount: Option<Decimal>,
    pub entries: Option<Vec<EntryRequest>>,
}
