//! Chart of accounts endpoints.

use crate::client::{segment, ApiClient};
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::models::{Account, AccountPatch, AccountQuery, AccountsByType, ChartSummary, NewAccount, Page};
use crate::request::ApiRequest;
use crate::transport::Transport;

impl<T: Transport, S: CredentialStore> ApiClient<T, S> {
    /// GET /accounts/ -> results of the first page.
    pub async fn list_accounts(&self, query: &AccountQuery) -> Result<Vec<Account>, ApiError> {
        let page: Page<Account> = self
            .get_json(ApiRequest::get("/accounts/").with_query(query.to_pairs()))
            .await?;
        Ok(page.results)
    }

    pub async fn get_account(&self, id: &str) -> Result<Account, ApiError> {
        self.get_json(ApiRequest::get(format!("/accounts/{}/", segment(id))))
            .await
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<Account, ApiError> {
        self.send_json(ApiRequest::post("/accounts/"), account).await
    }

    pub async fn update_account(&self, id: &str, patch: &AccountPatch) -> Result<Account, ApiError> {
        self.send_json(ApiRequest::patch(format!("/accounts/{}/", segment(id))), patch)
            .await
    }

    pub async fn delete_account(&self, id: &str) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(format!("/accounts/{}/", segment(id))))
            .await
    }

    /// GET /accounts/by_type/ -> active accounts grouped by type, ordered by code.
    pub async fn accounts_by_type(&self) -> Result<AccountsByType, ApiError> {
        self.get_json(ApiRequest::get("/accounts/by_type/")).await
    }

    pub async fn chart_summary(&self) -> Result<ChartSummary, ApiError> {
        self.get_json(ApiRequest::get("/accounts/chart_summary/")).await
    }
}
