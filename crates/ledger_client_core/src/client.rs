//! Authenticated API client.
//!
//! Every request is decorated with the stored access token. A 401 on a
//! request that has not been replayed triggers one refresh through
//! `POST /auth/refresh/`; on success the request is replayed once with the
//! new token, on failure both tokens are cleared and the session-expired hook
//! fires. Concurrent 401s are not deduplicated: each request refreshes on its
//! own.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::credentials::{CredentialKey, CredentialStore};
use crate::error::ApiError;
use crate::request::{ApiRequest, ApiResponse, PreparedRequest};
use crate::transport::{ReqwestTransport, Transport};

const REFRESH_PATH: &str = "/auth/refresh/";

type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

pub struct ApiClient<T, S> {
    config: ClientConfig,
    transport: T,
    credentials: S,
    on_session_expired: Option<SessionExpiredHook>,
}

impl<S: CredentialStore> ApiClient<ReqwestTransport, S> {
    /// Client over reqwest using the config's timeout.
    pub fn with_reqwest(config: ClientConfig, credentials: S) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(config, transport, credentials))
    }
}

impl<T: Transport, S: CredentialStore> ApiClient<T, S> {
    pub fn new(config: ClientConfig, transport: T, credentials: S) -> Self {
        Self {
            config,
            transport,
            credentials,
            on_session_expired: None,
        }
    }

    /// Called after credentials were cleared because a refresh failed. UIs use
    /// it to send the user back to the login entry point.
    pub fn on_session_expired<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &S {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request through the auth interceptor.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut request = request;
        loop {
            let response = self.dispatch(&request).await?;
            if response.is_success() {
                return Ok(response);
            }
            if response.status != 401 || request.is_retry() {
                return Err(ApiError::from_response(&response));
            }

            let Some(refresh_token) = self.credentials.get(CredentialKey::RefreshToken)? else {
                log::debug!("client: 401 on {} {} and no refresh token", request.method, request.path);
                return Err(ApiError::from_response(&response));
            };

            match self.refresh(&refresh_token).await {
                Ok(_) => {
                    log::debug!("client: token refreshed, replaying {} {}", request.method, request.path);
                    request = request.retried();
                }
                Err(e) => {
                    log::warn!("client: token refresh failed: {}", e);
                    self.expire_session()?;
                    return Err(ApiError::from_response(&response));
                }
            }
        }
    }

    /// Exchange a refresh token for a new access token and persist it. Bypasses
    /// the interceptor: no bearer header, no retry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        #[derive(serde::Deserialize)]
        struct RefreshResponse {
            access: String,
        }

        let prepared = PreparedRequest {
            method: reqwest::Method::POST,
            url: self.config.url(REFRESH_PATH),
            query: Vec::new(),
            bearer: None,
            body: Some(serde_json::json!({ "refresh": refresh_token })),
        };
        let response = self.transport.send(prepared).await?;
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        let parsed: RefreshResponse = response.json()?;
        self.credentials.set(CredentialKey::AccessToken, &parsed.access)?;
        Ok(parsed.access)
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        self.execute(request).await?.json()
    }

    pub(crate) async fn send_json<B: Serialize, R: DeserializeOwned>(
        &self,
        request: ApiRequest,
        body: &B,
    ) -> Result<R, ApiError> {
        let body = serde_json::to_value(body)?;
        self.execute(request.with_json(body)).await?.json()
    }

    pub(crate) async fn send_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let bearer = self.credentials.get(CredentialKey::AccessToken)?;
        let prepared = PreparedRequest {
            method: request.method.clone(),
            url: self.config.url(&request.path),
            query: request.query.clone(),
            bearer,
            body: request.body.clone(),
        };
        log::debug!(
            "client: {} {} attempt={}",
            prepared.method,
            prepared.url,
            request.attempt
        );
        self.transport.send(prepared).await
    }

    fn expire_session(&self) -> Result<(), ApiError> {
        self.credentials.clear()?;
        if let Some(hook) = self.on_session_expired.as_ref() {
            hook();
        }
        Ok(())
    }
}

/// Percent-encode an id for use as a path segment.
pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
