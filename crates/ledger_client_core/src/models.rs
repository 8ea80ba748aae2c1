//! Data models for accounts, transactions, dashboard metrics and auth tokens.
//! Wire format follows the accounting API: snake_case fields, string ids,
//! money as decimal strings (numbers are accepted too).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Revenue,
        AccountType::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        }
    }

    pub fn plural_label(&self) -> &'static str {
        match self {
            AccountType::Asset => "Assets",
            AccountType::Liability => "Liabilities",
            AccountType::Equity => "Equity",
            AccountType::Revenue => "Revenues",
            AccountType::Expense => "Expenses",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asset" => Ok(AccountType::Asset),
            "liability" => Ok(AccountType::Liability),
            "equity" => Ok(AccountType::Equity),
            "revenue" => Ok(AccountType::Revenue),
            "expense" => Ok(AccountType::Expense),
            other => Err(format!("unknown account type: {}", other)),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Draft,
    Pending,
    Posted,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Draft => "draft",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Posted => "posted",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(TransactionStatus::Draft),
            "pending" => Ok(TransactionStatus::Pending),
            "posted" => Ok(TransactionStatus::Posted),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Debit,
    Credit,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Debit => "debit",
            EntryType::Credit => "credit",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// Ledger account as returned by the API. `balance` is computed server-side
/// from posted entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub parent_account: Option<String>,
    #[serde(default)]
    pub parent_account_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub account: String,
    #[serde(default)]
    pub account_code: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    pub entry_type: EntryType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// Double-entry transaction. Entries are authoritative; nothing on the client
/// enforces that debits equal credits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub reference: String,
    pub date: NaiveDate,
    pub description: String,
    pub status: TransactionStatus,
    pub total_amount: Decimal,
    #[serde(default)]
    pub entries: Vec<TransactionEntry>,
    #[serde(default)]
    pub created_by_username: Option<String>,
    #[serde(default)]
    pub posted_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn debit_total(&self) -> Decimal {
        self.total_for(EntryType::Debit)
    }

    pub fn credit_total(&self) -> Decimal {
        self.total_for(EntryType::Credit)
    }

    pub fn is_balanced(&self) -> bool {
        self.debit_total() == self.credit_total()
    }

    /// Account codes (or ids when the code is missing) on one side, for display.
    pub fn account_codes(&self, entry_type: EntryType) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.entry_type == entry_type)
            .map(|e| e.account_code.as_deref().unwrap_or(e.account.as_str()))
            .collect()
    }

    fn total_for(&self, entry_type: EntryType) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.entry_type == entry_type)
            .map(|e| e.amount)
            .sum()
    }
}

/// Derived dashboard snapshot. `recent_transactions` is only filled by the
/// server endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
    pub total_revenues: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    #[serde(default)]
    pub recent_transactions: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub total_accounts: u64,
    pub by_type: BTreeMap<AccountType, u64>,
    pub total_balances: BTreeMap<AccountType, Decimal>,
}

pub type AccountsByType = BTreeMap<AccountType, Vec<Account>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

/// Paginated list envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_account: Option<String>,
    pub description: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub account: String,
    pub entry_type: EntryType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub reference: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    pub total_amount: Decimal,
    pub entries: Vec<NewEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    /// When present, replaces every entry of the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<NewEntry>>,
}

/// Server-side filters for `GET /accounts/`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountQuery {
    pub search: Option<String>,
    pub account_type: Option<AccountType>,
    pub ordering: Option<String>,
}

impl AccountQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(s) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), s.to_string()));
        }
        if let Some(t) = self.account_type {
            pairs.push(("account_type".to_string(), t.as_str().to_string()));
        }
        if let Some(o) = self.ordering.as_deref() {
            pairs.push(("ordering".to_string(), o.to_string()));
        }
        pairs
    }
}

/// Server-side filters for `GET /transactions/`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionQuery {
    pub search: Option<String>,
    pub status: Option<TransactionStatus>,
    pub date: Option<NaiveDate>,
    pub ordering: Option<String>,
}

impl TransactionQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(s) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), s.to_string()));
        }
        if let Some(st) = self.status {
            pairs.push(("status".to_string(), st.as_str().to_string()));
        }
        if let Some(d) = self.date {
            pairs.push(("date".to_string(), d.format("%Y-%m-%d").to_string()));
        }
        if let Some(o) = self.ordering.as_deref() {
            pairs.push(("ordering".to_string(), o.to_string()));
        }
        pairs
    }
}
