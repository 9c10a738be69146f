//! HTAP HTTP Transport
//!
//! The single seam between the gateway clients and the network. Clients
//! build an [`HttpRequest`], the transport delivers it and hands back the
//! raw status and body. Status interpretation stays with the caller.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use async_trait::async_trait;
use htap_common::{HtapError, Result};
use serde::de::DeserializeOwned;

// =============================================================================
// Request / Response
// =============================================================================

/// An outbound JSON POST.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look a header up by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(HtapError::from)
    }

    /// The `message` field of a JSON error body, if there is one.
    pub fn error_message(&self) -> Option<String> {
        let body: serde_json::Value = self.json().ok()?;
        body.get("message")?.as_str().map(str::to_string)
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Delivers JSON requests. Implementations must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!("POST {}", request.url);

        // Headers first: `json` only sets Content-Type when absent.
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let builder = builder.json(&request.body);

        let response = builder
            .send()
            .await
            .map_err(|e| HtapError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HtapError::Transport(e.to_string()))?;

        tracing::debug!("Response from {}: status={}, {} bytes", request.url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

// =============================================================================
// Tests
// =============================================================================
