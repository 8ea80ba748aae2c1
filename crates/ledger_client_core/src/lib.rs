//! Ledger dashboard client core.
//!
//! Typed models for the chart of accounts and the transaction ledger, an
//! authenticated HTTP client for the accounting API (bearer token attach,
//! single silent refresh-and-retry on 401), an injected credential store,
//! and the pure pieces the dashboard screens are built from: aggregation,
//! search and view state.

mod accounts;
mod auth;
mod transactions;

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod format;
pub mod metrics;
pub mod models;
pub mod request;
pub mod search;
pub mod transport;
pub mod view;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use credentials::{CredentialKey, CredentialStore, MemoryCredentialStore, SqliteCredentialStore};
pub use error::ApiError;
pub use models::{
    Account, AccountPatch, AccountQuery, AccountType, AccountsByType, AuthTokens, ChartSummary,
    DashboardMetrics, EntryType, NewAccount, NewEntry, NewTransaction, Page, Transaction,
    TransactionEntry, TransactionPatch, TransactionQuery, TransactionStatus,
};
pub use request::{ApiRequest, ApiResponse, PreparedRequest};
pub use transport::{ReqwestTransport, Transport};
pub use view::{ReportKind, View, ViewAction, ViewState};
