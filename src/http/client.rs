//! API client: the single request routine every scenario goes through

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::common::{Config, Result};

use super::transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};

/// Credential attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// No `Authorization` header
    None,
    /// The configured placeholder token
    Mock,
    /// An explicit token, e.g. a deliberately invalid one
    Token(String),
}

/// Client for the `/api` surface of the application under test
pub struct ApiClient {
    api_base: String,
    auth_token: String,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    pub fn new(
        api_base: impl Into<String>,
        auth_token: impl Into<String>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            auth_token: auth_token.into(),
            transport,
        }
    }

    /// Build a reqwest-backed client for the configured target
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.api_base()?,
            config.target.auth_token.clone(),
            Box::new(ReqwestTransport::new()?),
        ))
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send one request and wait for the reply
    ///
    /// Timeouts and connection failures come back as `Err`; any HTTP status,
    /// including 4xx/5xx, is an `Ok` reply for the caller to judge.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        auth: &Auth,
        timeout: Duration,
    ) -> Result<ApiResponse> {
        let bearer = match auth {
            Auth::None => None,
            Auth::Mock => Some(self.auth_token.clone()),
            Auth::Token(token) => Some(token.clone()),
        };

        let request = ApiRequest {
            method,
            url: self.url(path),
            bearer,
            body: body.cloned(),
            timeout,
        };

        tracing::debug!(
            %method,
            url = %request.url,
            timeout_secs = timeout.as_secs(),
            "sending request"
        );
        let started = Instant::now();
        let result = self.transport.send(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => {
                tracing::debug!(
                    %method,
                    path,
                    status = response.status,
                    elapsed_ms,
                    "response received"
                )
            }
            Err(e) => tracing::warn!(%method, path, elapsed_ms, error = %e, "request failed"),
        }

        result
    }

    pub async fn get(&self, path: &str, auth: &Auth, timeout: Duration) -> Result<ApiResponse> {
        self.execute(Method::Get, path, None, auth, timeout).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        auth: &Auth,
        timeout: Duration,
    ) -> Result<ApiResponse> {
        self.execute(Method::Post, path, Some(body), auth, timeout).await
    }
}
