//! Dashboard aggregation over in-memory collections. Pure and recomputed on
//! every render; empty input yields all-zero metrics.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Account, AccountType, DashboardMetrics, Transaction, TransactionStatus};

/// Balance sum per category. All five categories are always present.
pub fn balances_by_type(accounts: &[Account]) -> BTreeMap<AccountType, Decimal> {
    let mut totals: BTreeMap<AccountType, Decimal> =
        AccountType::ALL.iter().map(|t| (*t, Decimal::ZERO)).collect();
    for account in accounts {
        *totals.entry(account.account_type).or_default() += account.balance;
    }
    totals
}

/// Category sums and `net_income = revenues - expenses`.
pub fn summarize(accounts: &[Account]) -> DashboardMetrics {
    let totals = balances_by_type(accounts);
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
        recent_transactions: 0,
    }
}

/// Posted transactions dated on or after the first day of `today`'s month.
pub fn count_recent_posted(transactions: &[Transaction], today: NaiveDate) -> u64 {
    let month_start = today.with_day(1).unwrap_or(today);
    transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Posted && t.date >= month_start)
        .count() as u64
}

/// Up to `limit` transactions, newest date first (ties keep input order).
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}
