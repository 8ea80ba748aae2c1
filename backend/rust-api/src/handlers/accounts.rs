use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::account::account_order_clause;
use crate::models::ids::parse_id;
use crate::models::page::PageRequest;
use crate::models::{AccountListQuery, AccountResponse, AccountType, CreateAccountRequest, Page, UpdateAccountRequest};
use crate::services::ledger::{self, ChartSummary};
use crate::utils::{contains_pattern, non_blank};
use crate::AppState;

const ACCOUNT_SELECT: &str = r#"
    SELECT a.id, a.code, a.name, a.account_type, a.parent_account_id,
           p.name AS parent_account_name, a.is_active, a.description,
           a.created_at, a.updated_at,
           COALESCE(SUM(e.amount) FILTER (WHERE e.entry_type = 'debit'), 0) AS debit_total,
           COALESCE(SUM(e.amount) FILTER (WHERE e.entry_type = 'credit'), 0) AS credit_total
    FROM accounts a
    LEFT JOIN accounts p ON p.id = a.parent_account_id
    LEFT JOIN (
        transaction_entries e
        JOIN transactions t ON t.id = e.transaction_id AND t.status = 'posted'
    ) ON e.account_id = a.id
"#;

const CODE_MAX: usize = 20;
const NAME_MAX: usize = 255;

#[derive(Debug, Default)]
pub(crate) struct AccountFilter {
    pub id: Option<Uuid>,
    pub search: Option<String>,
    pub account_type: Option<AccountType>,
    pub parent: Option<Uuid>,
    pub include_inactive: bool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AccountFilter) {
    qb.push(" WHERE TRUE");
    if !filter.include_inactive {
        qb.push(" AND a.is_active = true");
    }
    if let Some(id) = filter.id {
        qb.push(" AND a.id = ").push_bind(id);
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = contains_pattern(term);
        qb.push(" AND (a.code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(account_type) = filter.account_type {
        qb.push(" AND a.account_type = ").push_bind(account_type.as_str());
    }
    if let Some(parent) = filter.parent {
        qb.push(" AND a.parent_account_id = ").push_bind(parent);
    }
}

/// Accounts with balances computed from posted entries.
pub(crate) async fn fetch_accounts(
    pool: &PgPool,
    filter: &AccountFilter,
    order: &str,
    page: Option<PageRequest>,
) -> Result<Vec<AccountResponse>, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new(ACCOUNT_SELECT);
    push_filters(&mut qb, filter);
    qb.push(" GROUP BY a.id, p.name ORDER BY ").push(order);
    if let Some(page) = page {
        qb.push(" LIMIT ").push_bind(page.size).push(" OFFSET ").push_bind(page.offset());
    }
    let accounts = qb.build_query_as::<AccountResponse>().fetch_all(pool).await?;
    Ok(accounts)
}

async fn count_accounts(pool: &PgPool, filter: &AccountFilter) -> Result<i64, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM accounts a");
    push_filters(&mut qb, filter);
    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

async fn load_account(pool: &PgPool, id: Uuid, include_inactive: bool) -> Result<AccountResponse, AppError> {
    let filter = AccountFilter {
        id: Some(id),
        include_inactive,
        ..Default::default()
    };
    fetch_accounts(pool, &filter, "a.code ASC", None)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound)
}

async fn ensure_parent_exists(pool: &PgPool, parent: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
        .bind(parent)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(AppError::BadRequest(format!(
            "parent_account: Invalid pk \"{}\" - object does not exist.",
            parent
        )));
    }
    Ok(())
}

pub async fn list_accounts(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<Page<AccountResponse>>, AppError> {
    let account_type = non_blank(query.account_type.as_deref())
        .map(str::parse::<AccountType>)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("account_type: {}", e)))?;
    let parent = non_blank(query.parent_account.as_deref())
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| AppError::BadRequest("parent_account: Select a valid choice.".into()))?;
    let filter = AccountFilter {
        search: non_blank(query.search.as_deref()).map(str::to_string),
        account_type,
        parent,
        ..Default::default()
    };

    let page = PageRequest::new(query.page, state.config.page_size)?;
    let count = count_accounts(&state.db_pool, &filter).await?;
    page.check_in_range(count)?;
    let accounts = fetch_accounts(
        &state.db_pool,
        &filter,
        account_order_clause(query.ordering.as_deref()),
        Some(page),
    )
    .await?;
    Ok(Json(Page::new(accounts, count, page, &uri)))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(load_account(&state.db_pool, id, false).await?))
}

pub async fn create_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    ledger::validate_text("code", &payload.code, CODE_MAX)?;
    ledger::validate_text("name", &payload.name, NAME_MAX)?;
    if let Some(parent) = payload.parent_account {
        ensure_parent_exists(&state.db_pool, parent).await?;
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO accounts (id, code, name, account_type, parent_account_id, is_active, description, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(id)
    .bind(payload.code.trim())
    .bind(payload.name.trim())
    .bind(payload.account_type.as_str())
    .bind(payload.parent_account)
    .bind(payload.is_active)
    .bind(&payload.description)
    .bind(user.user_id)
    .execute(&*state.db_pool)
    .await?;

    tracing::info!("accounts: {} created {} ({})", user.username, payload.code.trim(), id);
    let account = load_account(&state.db_pool, id, true).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let id = parse_id(&id)?;
    if let Some(code) = payload.code.as_deref() {
        ledger::validate_text("code", code, CODE_MAX)?;
    }
    if let Some(name) = payload.name.as_deref() {
        ledger::validate_text("name", name, NAME_MAX)?;
    }
    if let Some(Some(parent)) = payload.parent_account {
        if parent == id {
            return Err(AppError::BadRequest("parent_account: An account cannot be its own parent.".into()));
        }
        ensure_parent_exists(&state.db_pool, parent).await?;
    }

    let mut qb = QueryBuilder::<Postgres>::new("UPDATE accounts SET updated_at = NOW()");
    if let Some(code) = payload.code.as_deref() {
        qb.push(", code = ").push_bind(code.trim().to_string());
    }
    if let Some(name) = payload.name.as_deref() {
        qb.push(", name = ").push_bind(name.trim().to_string());
    }
    if let Some(account_type) = payload.account_type {
        qb.push(", account_type = ").push_bind(account_type.as_str());
    }
    if let Some(parent) = payload.parent_account {
        qb.push(", parent_account_id = ").push_bind(parent);
    }
    if let Some(is_active) = payload.is_active {
        qb.push(", is_active = ").push_bind(is_active);
    }
    if let Some(description) = payload.description {
        qb.push(", description = ").push_bind(description);
    }
    qb.push(" WHERE id = ").push_bind(id).push(" AND is_active = true");

    let result = qb.build().execute(&*state.db_pool).await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(load_account(&state.db_pool, id, true).await?))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1 AND is_active = true)")
        .bind(id)
        .fetch_one(&*state.db_pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound);
    }

    let referenced: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM transaction_entries WHERE account_id = $1)")
        .bind(id)
        .fetch_one(&*state.db_pool)
        .await?;
    if referenced {
        return Err(AppError::Conflict(
            "Cannot delete account: it is referenced by transaction entries".into(),
        ));
    }

    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(id)
        .execute(&*state.db_pool)
        .await?;
    tracing::info!("accounts: deleted {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn accounts_by_type(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<AccountType, Vec<AccountResponse>>>, AppError> {
    let accounts = fetch_accounts(&state.db_pool, &AccountFilter::default(), "a.code ASC", None).await?;
    Ok(Json(ledger::group_by_type(accounts)))
}

pub async fn chart_summary(State(state): State<AppState>) -> Result<Json<ChartSummary>, AppError> {
    let accounts = fetch_accounts(&state.db_pool, &AccountFilter::default(), "a.code ASC", None).await?;
    Ok(Json(ledger::chart_summary(&accounts)))
}
