//! Double-entry bookkeeping rules, independent of storage.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{AccountResponse, AccountType, EntryType, TransactionStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Only pending transactions can be posted")]
    NotPending,
    #[error("Debit and credit totals must be equal")]
    Unbalanced,
    #[error("Posted transactions cannot be cancelled")]
    AlreadyPosted,
    #[error("Transactions are posted through post_transaction")]
    PostThroughAction,
    #[error("Posted transactions cannot be modified")]
    PostedIsFinal,
    #[error("{0}: Ensure this value is greater than or equal to 0.01.")]
    AmountTooSmall(&'static str),
    #[error("{0}: Ensure that there are no more than 2 decimal places.")]
    TooManyDecimals(&'static str),
    #[error("{0}: Ensure that there are no more than 13 digits before the decimal point.")]
    TooManyDigits(&'static str),
    #[error("{0}: This field may not be blank.")]
    Blank(&'static str),
    #[error("{field}: Ensure this field has no more than {max} characters.")]
    TooLong { field: &'static str, max: usize },
}

const MAX_WHOLE_AMOUNT: i64 = 10_000_000_000_000;

/// Balance from posted debit/credit sums. Asset and expense accounts grow
/// with debits; liability, equity and revenue accounts grow with credits.
pub fn signed_balance(account_type: AccountType, debits: Decimal, credits: Decimal) -> Decimal {
    let mut balance = match account_type {
        AccountType::Asset | AccountType::Expense => debits - credits,
        AccountType::Liability | AccountType::Equity | AccountType::Revenue => credits - debits,
    };
    balance.rescale(2);
    balance
}

/// Amounts are stored as NUMERIC(15, 2).
pub fn validate_amount(field: &'static str, amount: Decimal) -> Result<(), LedgerError> {
    if amount.normalize().scale() > 2 {
        return Err(LedgerError::TooManyDecimals(field));
    }
    if amount.trunc().abs() >= Decimal::from(MAX_WHOLE_AMOUNT) {
        return Err(LedgerError::TooManyDigits(field));
    }
    if amount < Decimal::new(1, 2) {
        return Err(LedgerError::AmountTooSmall(field));
    }
    Ok(())
}

pub fn validate_text(field: &'static str, value: &str, max: usize) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::Blank(field));
    }
    if value.chars().count() > max {
        return Err(LedgerError::TooLong { field, max });
    }
    Ok(())
}

/// (debit total, credit total)
pub fn entry_totals<'a, I>(entries: I) -> (Decimal, Decimal)
where
    I: IntoIterator<Item = (EntryType, &'a Decimal)>,
{
    entries
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(debit, credit), (kind, amount)| match kind {
            EntryType::Debit => (debit + amount, credit),
            EntryType::Credit => (debit, credit + amount),
        })
}

pub fn check_can_post(status: TransactionStatus, debits: Decimal, credits: Decimal) -> Result<(), LedgerError> {
    if status != TransactionStatus::Pending {
        return Err(LedgerError::NotPending);
    }
    if debits != credits {
        return Err(LedgerError::Unbalanced);
    }
    Ok(())
}

pub fn check_can_cancel(status: TransactionStatus) -> Result<(), LedgerError> {
    if status == TransactionStatus::Posted {
        return Err(LedgerError::AlreadyPosted);
    }
    Ok(())
}

/// Status a client may set directly on create or update.
pub fn check_assignable_status(status: TransactionStatus) -> Result<(), LedgerError> {
    if status == TransactionStatus::Posted {
        return Err(LedgerError::PostThroughAction);
    }
    Ok(())
}

/// Accounts grouped per type (all five keys present), preserving input order.
pub fn group_by_type(accounts: Vec<AccountResponse>) -> BTreeMap<AccountType, Vec<AccountResponse>> {
    let mut grouped: BTreeMap<AccountType, Vec<AccountResponse>> =
        AccountType::ALL.iter().map(|t| (*t, Vec::new())).collect();
    for account in accounts {
        grouped.entry(account.account_type).or_default().push(account);
    }
    grouped
}

pub fn type_totals(accounts: &[AccountResponse]) -> BTreeMap<AccountType, Decimal> {
    let mut totals: BTreeMap<AccountType, Decimal> =
        AccountType::ALL.iter().map(|t| (*t, Decimal::new(0, 2))).collect();
    for account in accounts {
        *totals.entry(account.account_type).or_default() += account.balance;
    }
    totals
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChartSummary {
    pub total_accounts: usize,
    pub by_type: BTreeMap<AccountType, usize>,
    pub total_balances: BTreeMap<AccountType, Decimal>,
}

pub fn chart_summary(accounts: &[AccountResponse]) -> ChartSummary {
    let mut by_type: BTreeMap<AccountType, usize> = AccountType::ALL.iter().map(|t| (*t, 0)).collect();
    for account in accounts {
        *by_type.entry(account.account_type).or_default() += 1;
    }
    ChartSummary {
        total_accounts: accounts.len(),
        by_type,
        total_balances: type_totals(accounts),
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardMetrics {
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
    pub total_revenues: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub recent_transactions: i64,
}

pub fn dashboard_metrics(accounts: &[AccountResponse], recent_posted: i64) -> DashboardMetrics {
    let totals = type_totals(accounts);
    let total = |t: AccountType| totals.get(&t).copied().unwrap_or_default();
    let total_revenues = total(AccountType::Revenue);
    let total_expenses = total(AccountType::Expense);
    DashboardMetrics {
        total_assets: total(AccountType::Asset),
        total_liabilities: total(AccountType::Liability),
        total_equity: total(AccountType::Equity),
        total_revenues,
        total_expenses,
        net_income: total_revenues - total_expenses,
        recent_transactions: recent_posted,
    }
}
