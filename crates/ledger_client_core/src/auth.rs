//! POST /auth/login/ and session helpers.

use crate::client::ApiClient;
use crate::credentials::{CredentialKey, CredentialStore};
use crate::error::ApiError;
use crate::models::AuthTokens;
use crate::request::ApiRequest;
use crate::transport::Transport;

impl<T: Transport, S: CredentialStore> ApiClient<T, S> {
    /// POST /auth/login/ -> { access, refresh }; both tokens are persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthTokens, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let tokens: AuthTokens = self
            .send_json(ApiRequest::post("/auth/login/"), &body)
            .await?;
        self.credentials().set(CredentialKey::AccessToken, &tokens.access)?;
        self.credentials().set(CredentialKey::RefreshToken, &tokens.refresh)?;
        log::info!("auth: logged in as {}", username);
        Ok(tokens)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.credentials().clear()
    }

    pub fn is_logged_in(&self) -> Result<bool, ApiError> {
        Ok(self.credentials().get(CredentialKey::AccessToken)?.is_some())
    }
}
