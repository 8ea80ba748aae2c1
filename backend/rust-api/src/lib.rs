// Library root: router, state and modules shared by the server binary,
// the admin tools and the integration tests.

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use config::Config;
pub use error::AppError;

use database::DatabasePool;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabasePool,
    pub config: Arc<Config>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login/", post(handlers::login))
        .route("/api/auth/refresh/", post(handlers::refresh))
        .route("/api/accounts/", get(handlers::list_accounts).post(handlers::create_account))
        .route("/api/accounts/by_type/", get(handlers::accounts_by_type))
        .route("/api/accounts/chart_summary/", get(handlers::chart_summary))
        .route(
            "/api/accounts/:id/",
            get(handlers::get_account)
                .patch(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .route(
            "/api/transactions/",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/api/transactions/dashboard_metrics/", get(handlers::dashboard_metrics))
        .route(
            "/api/transactions/:id/",
            get(handlers::get_transaction)
                .patch(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        .route("/api/transactions/:id/post_transaction/", post(handlers::post_transaction))
        .route("/api/transactions/:id/cancel_transaction/", post(handlers::cancel_transaction))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::security_headers_middleware))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
