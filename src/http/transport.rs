//! HTTP transport seam
//!
//! Everything the harness sends goes through [`Transport::send`]. The
//! production implementation wraps `reqwest`; tests swap in a scripted fake.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::common::{Error, Result};

/// Longest body excerpt carried into diagnostics
const SNIPPET_CHARS: usize = 200;

/// HTTP methods the API surface uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A fully resolved request, ready to put on the wire
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Bearer token for the `Authorization` header, if any
    pub bearer: Option<String>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

/// Status and raw body of a reply
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|e| Error::malformed_body(self.status, e))
    }

    /// Leading part of the body for diagnostics
    pub fn snippet(&self) -> String {
        let body = self.body.trim();
        if body.chars().count() > SNIPPET_CHARS {
            let head: String = body.chars().take(SNIPPET_CHARS).collect();
            format!("{head}...")
        } else {
            body.to_string()
        }
    }
}

/// Sends one request and waits (bounded by the request timeout) for the reply
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Transport backed by a shared `reqwest::Client`
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("accommodation-harness/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self { client })
    }

    fn map_error(error: reqwest::Error, request: &ApiRequest) -> Error {
        if error.is_timeout() {
            return Error::Timeout(request.timeout);
        }

        let reason = match error.source() {
            Some(source) => format!("{error}: {source}"),
            None => error.to_string(),
        };

        if error.is_connect() {
            Error::connection_failed(&request.url, reason)
        } else {
            Error::Http(reason)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        let mut builder = builder
            .timeout(request.timeout)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(e, &request))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Self::map_error(e, &request))?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let response = ApiResponse::new(500, "é".repeat(300));
        let snippet = response.snippet();
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS + 3);
    }

    #[test]
    fn test_json_reports_status_on_malformed_body() {
        let response = ApiResponse::new(200, "<html>oops</html>");
        match response.json() {
            Err(Error::MalformedBody { status, .. }) => assert_eq!(status, 200),
            other => panic!("Expected MalformedBody, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_maps_to_transport_error() {
        let transport = ReqwestTransport::new().unwrap();
        let result = transport
            .send(ApiRequest {
                method: Method::Get,
                url: "http://127.0.0.1:1/api/root".to_string(),
                bearer: None,
                body: None,
                timeout: Duration::from_secs(5),
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");
    }
}
