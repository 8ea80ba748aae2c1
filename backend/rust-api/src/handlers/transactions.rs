use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Row};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use super::accounts::{fetch_accounts, AccountFilter};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::ids::parse_id;
use crate::models::page::PageRequest;
use crate::models::transaction::transaction_order_clause;
use crate::models::{
    CreateTransactionRequest, EntryRequest, EntryResponse, EntryType, Page, TransactionListQuery,
    TransactionResponse, TransactionStatus, UpdateTransactionRequest,
};
use crate::services::ledger::{self, DashboardMetrics, LedgerError};
use crate::utils::{contains_pattern, non_blank};
use crate::AppState;

const TRANSACTION_SELECT: &str = r#"
    SELECT t.id, t.reference, t.date, t.description, t.status, t.total_amount,
           cu.username AS created_by_username, pu.username AS posted_by_username,
           t.created_at, t.updated_at, t.posted_at
    FROM transactions t
    LEFT JOIN users cu ON cu.id = t.created_by
    LEFT JOIN users pu ON pu.id = t.posted_by
"#;

const REFERENCE_MAX: usize = 50;
const ENTRY_DESCRIPTION_MAX: usize = 255;

#[derive(Debug, Default)]
struct TransactionFilter {
    id: Option<Uuid>,
    search: Option<String>,
    status: Option<TransactionStatus>,
    date: Option<chrono::NaiveDate>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
    qb.push(" WHERE TRUE");
    if let Some(id) = filter.id {
        qb.push(" AND t.id = ").push_bind(id);
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = contains_pattern(term);
        qb.push(" AND (t.reference ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND t.status = ").push_bind(status.as_str());
    }
    if let Some(date) = filter.date {
        qb.push(" AND t.date = ").push_bind(date);
    }
}

/// Fill `entries`, ordered by side then account code.
async fn attach_entries(pool: &PgPool, transactions: &mut [TransactionResponse]) -> Result<(), AppError> {
    if transactions.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = transactions.iter().map(|t| t.id).collect();
    let entries = sqlx::query_as::<_, EntryResponse>(
        r#"
        SELECT e.id, e.transaction_id, e.account_id, a.code AS account_code, a.name AS account_name,
               e.entry_type, e.amount, e.description
        FROM transaction_entries e
        JOIN accounts a ON a.id = e.account_id
        WHERE e.transaction_id = ANY($1)
        ORDER BY e.entry_type, a.code
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_transaction: HashMap<Uuid, Vec<EntryResponse>> = HashMap::new();
    for entry in entries {
        by_transaction.entry(entry.transaction_id).or_default().push(entry);
    }
    for t in transactions.iter_mut() {
        t.entries = by_transaction.remove(&t.id).unwrap_or_default();
    }
    Ok(())
}

async fn load_transaction(pool: &PgPool, id: Uuid) -> Result<TransactionResponse, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new(TRANSACTION_SELECT);
    push_filters(
        &mut qb,
        &TransactionFilter {
            id: Some(id),
            ..Default::default()
        },
    );
    let row = qb
        .build_query_as::<TransactionResponse>()
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut loaded = vec![row];
    attach_entries(pool, &mut loaded).await?;
    loaded.pop().ok_or(AppError::NotFound)
}

fn validate_entries(entries: &[EntryRequest]) -> Result<(), LedgerError> {
    for entry in entries {
        ledger::validate_amount("amount", entry.amount)?;
        if entry.description.chars().count() > ENTRY_DESCRIPTION_MAX {
            return Err(LedgerError::TooLong {
                field: "description",
                max: ENTRY_DESCRIPTION_MAX,
            });
        }
    }
    Ok(())
}

async fn ensure_accounts_exist(conn: &mut PgConnection, entries: &[EntryRequest]) -> Result<(), AppError> {
    let wanted: BTreeSet<Uuid> = entries.iter().map(|e| e.account).collect();
    if wanted.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = wanted.iter().copied().collect();
    let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_one(&mut *conn)
        .await?;
    if found != ids.len() as i64 {
        return Err(AppError::BadRequest("account: Invalid pk - object does not exist.".into()));
    }
    Ok(())
}

async fn insert_entries(conn: &mut PgConnection, transaction_id: Uuid, entries: &[EntryRequest]) -> Result<(), AppError> {
    for entry in entries {
        sqlx::query(
            "INSERT INTO transaction_entries (id, transaction_id, account_id, entry_type, amount, description)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(transaction_id)
        .bind(entry.account)
        .bind(entry.entry_type.as_str())
        .bind(entry.amount)
        .bind(&entry.description)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Lock the row and return its status.
async fn lock_status(conn: &mut PgConnection, id: Uuid) -> Result<TransactionStatus, AppError> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM transactions WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let status = status.ok_or(AppError::NotFound)?;
    status.parse().map_err(AppError::Internal)
}

pub async fn list_transactions(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Page<TransactionResponse>>, AppError> {
    let status = non_blank(query.status.as_deref())
        .map(str::parse::<TransactionStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("status: {}", e)))?;
    let filter = TransactionFilter {
        search: non_blank(query.search.as_deref()).map(str::to_string),
        status,
        date: query.date,
        ..Default::default()
    };

    let page = PageRequest::new(query.page, state.config.page_size)?;
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions t");
    push_filters(&mut count_qb, &filter);
    let count: i64 = count_qb.build_query_scalar().fetch_one(&*state.db_pool).await?;
    page.check_in_range(count)?;

    let mut qb = QueryBuilder::<Postgres>::new(TRANSACTION_SELECT);
    push_filters(&mut qb, &filter);
    qb.push(" ORDER BY ")
        .push(transaction_order_clause(query.ordering.as_deref()))
        .push(" LIMIT ")
        .push_bind(page.size)
        .push(" OFFSET ")
        .push_bind(page.offset());
    let mut transactions = qb
        .build_query_as::<TransactionResponse>()
        .fetch_all(&*state.db_pool)
        .await?;
    attach_entries(&state.db_pool, &mut transactions).await?;

    Ok(Json(Page::new(transactions, count, page, &uri)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResponse>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(load_transaction(&state.db_pool, id).await?))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    ledger::validate_text("reference", &payload.reference, REFERENCE_MAX)?;
    ledger::validate_amount("total_amount", payload.total_amount)?;
    validate_entries(&payload.entries)?;
    let status = payload.status.unwrap_or(TransactionStatus::Draft);
    ledger::check_assignable_status(status)?;

    let id = Uuid::new_v4();
    let mut tx = state.db_pool.begin().await?;
    ensure_accounts_exist(&mut tx, &payload.entries).await?;
    sqlx::query(
        "INSERT INTO transactions (id, reference, date, description, status, total_amount, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(payload.reference.trim())
    .bind(payload.date)
    .bind(&payload.description)
    .bind(status.as_str())
    .bind(payload.total_amount)
    .bind(user.user_id)
    .execute(&mut *tx)
    .await?;
    insert_entries(&mut tx, id, &payload.entries).await?;
    tx.commit().await?;

    tracing::info!(
        "transactions: {} created {} with {} entries",
        user.username,
        payload.reference.trim(),
        payload.entries.len()
    );
    let created = load_transaction(&state.db_pool, id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    let id = parse_id(&id)?;
    if let Some(reference) = payload.reference.as_deref() {
        ledger::validate_text("reference", reference, REFERENCE_MAX)?;
    }
    if let Some(total) = payload.total_amount {
        ledger::validate_amount("total_amount", total)?;
    }
    if let Some(status) = payload.status {
        ledger::check_assignable_status(status)?;
    }
    if let Some(entries) = payload.entries.as_deref() {
        validate_entries(entries)?;
    }

    let mut tx = state.db_pool.begin().await?;
    if lock_status(&mut tx, id).await? == TransactionStatus::Posted {
        return Err(LedgerError::PostedIsFinal.into());
    }

    let mut qb = QueryBuilder::<Postgres>::new("UPDATE transactions SET updated_at = NOW()");
    if let Some(reference) = payload.reference.as_deref() {
        qb.push(", reference = ").push_bind(reference.trim().to_string());
    }
    if let Some(date) = payload.date {
        qb.push(", date = ").push_bind(date);
    }
    if let Some(description) = payload.description.clone() {
        qb.push(", description = ").push_bind(description);
    }
    if let Some(status) = payload.status {
        qb.push(", status = ").push_bind(status.as_str());
    }
    if let Some(total) = payload.total_amount {
        qb.push(", total_amount = ").push_bind(total);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.build().execute(&mut *tx).await?;

    if let Some(entries) = payload.entries.as_deref() {
        ensure_accounts_exist(&mut tx, entries).await?;
        sqlx::query("DELETE FROM transaction_entries WHERE transaction_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_entries(&mut tx, id, entries).await?;
    }
    tx.commit().await?;

    Ok(Json(load_transaction(&state.db_pool, id).await?))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
        .bind(id)
        .execute(&*state.db_pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!("transactions: deleted {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    let mut tx = state.db_pool.begin().await?;
    let status = lock_status(&mut tx, id).await?;

    let rows = sqlx::query("SELECT entry_type, amount FROM transaction_entries WHERE transaction_id = $1")
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
    let mut sides: Vec<(EntryType, Decimal)> = Vec::with_capacity(rows.len());
    for row in &rows {
        let kind: String = row.try_get("entry_type")?;
        let kind: EntryType = kind.parse().map_err(AppError::Internal)?;
        sides.push((kind, row.try_get("amount")?));
    }
    let (debits, credits) = ledger::entry_totals(sides.iter().map(|(k, a)| (*k, a)));
    ledger::check_can_post(status, debits, credits)?;

    sqlx::query(
        "UPDATE transactions SET status = 'posted', posted_at = NOW(), posted_by = $2, updated_at = NOW()
         WHERE id = $1",
    )
    .bind(id)
    .bind(user.user_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!("transactions: {} posted {}", user.username, id);
    Ok(Json(serde_json::json!({ "status": "Transaction posted successfully" })))
}

pub async fn cancel_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    let mut tx = state.db_pool.begin().await?;
    let status = lock_status(&mut tx, id).await?;
    ledger::check_can_cancel(status)?;

    sqlx::query("UPDATE transactions SET status = 'cancelled', updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("transactions: cancelled {}", id);
    Ok(Json(serde_json::json!({ "status": "Transaction cancelled successfully" })))
}

/// Category totals over active accounts and the count of posted
/// transactions dated this month.
pub async fn dashboard_metrics(State(state): State<AppState>) -> Result<Json<DashboardMetrics>, AppError> {
    let accounts = fetch_accounts(&state.db_pool, &AccountFilter::default(), "a.code ASC", None).await?;

    let today = Utc::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);
    let recent: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE status = 'posted' AND date >= $1")
        .bind(month_start)
        .fetch_one(&*state.db_pool)
        .await?;

    Ok(Json(ledger::dashboard_metrics(&accounts, recent)))
}
