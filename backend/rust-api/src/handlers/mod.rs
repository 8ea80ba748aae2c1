pub mod accounts;
pub mod auth;
pub mod transactions;

pub use accounts::{
    accounts_by_type, chart_summary, create_account, delete_account, get_account, list_accounts, update_account,
};
pub use auth::{login, refresh, LoginRequest, RefreshRequest, RefreshResponse};
pub use transactions::{
    cancel_transaction, create_transaction, dashboard_metrics, delete_transaction, get_transaction,
    list_transactions, post_transaction, update_transaction,
};
