//! Transaction ledger endpoints, including the post/cancel actions.

use crate::client::{segment, ApiClient};
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::models::{DashboardMetrics, NewTransaction, Page, Transaction, TransactionPatch, TransactionQuery};
use crate::request::ApiRequest;
use crate::transport::Transport;

fn detail_path(id: &str) -> String {
    format!("/transactions/{}/", segment(id))
}

impl<T: Transport, S: CredentialStore> ApiClient<T, S> {
    /// GET /transactions/ -> results of the first page (newest first).
    pub async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, ApiError> {
        let page: Page<Transaction> = self
            .get_json(ApiRequest::get("/transactions/").with_query(query.to_pairs()))
            .await?;
        Ok(page.results)
    }

    pub async fn get_transaction(&self, id: &str) -> Result<Transaction, ApiError> {
        self.get_json(ApiRequest::get(detail_path(id))).await
    }

    pub async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction, ApiError> {
        self.send_json(ApiRequest::post("/transactions/"), transaction)
            .await
    }

    pub async fn update_transaction(&self, id: &str, patch: &TransactionPatch) -> Result<Transaction, ApiError> {
        self.send_json(ApiRequest::patch(detail_path(id)), patch).await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(detail_path(id))).await
    }

    /// POST /transactions/{id}/post_transaction/ (pending -> posted).
    pub async fn post_transaction(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/transactions/{}/post_transaction/", segment(id));
        self.send_empty(ApiRequest::post(path)).await
    }

    pub async fn cancel_transaction(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/transactions/{}/cancel_transaction/", segment(id));
        self.send_empty(ApiRequest::post(path)).await
    }

    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ApiError> {
        self.get_json(ApiRequest::get("/transactions/dashboard_metrics/"))
            .await
    }
}
