//! Text rendering of the dashboard screens.

use std::collections::BTreeMap;
use std::fmt::Write;

use ledger_client_core::format::format_money;
use ledger_client_core::{
    Account, AccountType, AccountsByType, ChartSummary, DashboardMetrics, EntryType, ReportKind, Transaction,
    ViewState,
};
use rust_decimal::Decimal;

pub fn header(state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", state.view.title());
    let _ = writeln!(out, "{}", state.view.subtitle());
    if !state.search.is_empty() {
        let _ = writeln!(out, "Search: \"{}\"", state.search);
    }
    out.push('\n');
    out
}

pub fn dashboard(
    metrics: &DashboardMetrics,
    balances: &BTreeMap<AccountType, Decimal>,
    recent: &[&Transaction],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:>18}", "Total Assets", format_money(metrics.total_assets));
    let _ = writeln!(out, "{:<20} {:>18}", "Total Liabilities", format_money(metrics.total_liabilities));
    let _ = writeln!(out, "{:<20} {:>18}", "Net Income", format_money(metrics.net_income));
    if metrics.recent_transactions > 0 {
        let _ = writeln!(out, "{:<20} {:>18}", "Posted this month", metrics.recent_transactions);
    }

    let _ = writeln!(out, "\nRecent Transactions");
    if recent.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for t in recent {
        let _ = writeln!(
            out,
            "  {}  {:<12} {:<32} {:>14}  {}",
            t.date,
            t.reference,
            truncate(&t.description, 32),
            format_money(t.total_amount),
            t.status
        );
    }

    let _ = writeln!(out, "\nAccount Balances by Type");
    for (account_type, total) in balances {
        let _ = writeln!(out, "  {:<14} {:>18}", account_type.plural_label(), format_money(*total));
    }
    out
}

pub fn accounts(accounts: &[&Account]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:<32} {:<10} {:>16}", "Code", "Name", "Type", "Balance");
    for a in accounts {
        let _ = writeln!(
            out,
            "{:<8} {:<32} {:<10} {:>16}",
            a.code,
            truncate(&a.name, 32),
            a.account_type,
            format_money(a.balance)
        );
    }
    let _ = writeln!(out, "\n{} account(s)", accounts.len());
    out
}

pub fn account_detail(account: &Account) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", account.code, account.name);
    let _ = writeln!(out, "  id:       {}", account.id);
    let _ = writeln!(out, "  type:     {}", account.account_type);
    if let Some(parent) = account.parent_account_name.as_deref().or(account.parent_account.as_deref()) {
        let _ = writeln!(out, "  parent:   {}", parent);
    }
    let _ = writeln!(out, "  active:   {}", if account.is_active { "yes" } else { "no" });
    let _ = writeln!(out, "  balance:  {}", format_money(account.balance));
    if !account.description.is_empty() {
        let _ = writeln!(out, "  notes:    {}", account.description);
    }
    out
}

pub fn accounts_by_type(grouped: &AccountsByType) -> String {
    let mut out = String::new();
    for account_type in AccountType::ALL {
        let list = grouped.get(&account_type).map(Vec::as_slice).unwrap_or_default();
        let _ = writeln!(out, "{} ({})", account_type.plural_label(), list.len());
        for a in list {
            let _ = writeln!(out, "  {:<8} {:<32} {:>16}", a.code, truncate(&a.name, 32), format_money(a.balance));
        }
    }
    out
}

pub fn chart_summary(summary: &ChartSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} active account(s)", summary.total_accounts);
    for account_type in AccountType::ALL {
        let count = summary.by_type.get(&account_type).copied().unwrap_or_default();
        let total = summary.total_balances.get(&account_type).copied().unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<14} {:>4}  {:>18}",
            account_type.plural_label(),
            count,
            format_money(total)
        );
    }
    out
}

pub fn transactions(transactions: &[&Transaction]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<12} {:<32} {:<16} {:>14} {}",
        "Date", "Reference", "Description", "Accounts", "Amount", "Status"
    );
    for t in transactions {
        let accounts = format!(
            "{} / {}",
            t.account_codes(EntryType::Debit).join(","),
            t.account_codes(EntryType::Credit).join(",")
        );
        let _ = writeln!(
            out,
            "{:<10} {:<12} {:<32} {:<16} {:>14} {}",
            t.date,
            t.reference,
            truncate(&t.description, 32),
            truncate(&accounts, 16),
            format_money(t.total_amount),
            t.status
        );
    }
    let _ = writeln!(out, "\n{} transaction(s)", transactions.len());
    out
}

pub fn transaction_detail(t: &Transaction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", t.reference, t.description);
    let _ = writeln!(out, "  id:      {}", t.id);
    let _ = writeln!(out, "  date:    {}", t.date);
    let _ = writeln!(out, "  status:  {}", t.status);
    let _ = writeln!(out, "  amount:  {}", format_money(t.total_amount));
    if let Some(user) = t.created_by_username.as_deref() {
        let _ = writeln!(out, "  created: {} ({})", t.created_at.format("%Y-%m-%d %H:%M"), user);
    }
    if let (Some(at), Some(user)) = (t.posted_at, t.posted_by_username.as_deref()) {
        let _ = writeln!(out, "  posted:  {} ({})", at.format("%Y-%m-%d %H:%M"), user);
    }
    let _ = writeln!(out, "  entries:");
    for e in &t.entries {
        let label = e.account_code.as_deref().unwrap_or(e.account.as_str());
        let name = e.account_name.as_deref().unwrap_or("");
        let (debit, credit) = match e.entry_type {
            EntryType::Debit => (format_money(e.amount), String::new()),
            EntryType::Credit => (String::new(), format_money(e.amount)),
        };
        let _ = writeln!(out, "    {:<8} {:<28} {:>14} {:>14}", label, truncate(name, 28), debit, credit);
    }
    if !t.is_balanced() {
        let _ = writeln!(
            out,
            "  warning: debits {} != credits {}",
            format_money(t.debit_total()),
            format_money(t.credit_total())
        );
    }
    out
}

pub fn reports() -> String {
    let mut out = String::new();
    for report in ReportKind::ALL {
        let _ = writeln!(out, "{:<22} {}", report.title(), report.description());
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
