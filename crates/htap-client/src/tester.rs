//! HTAP Connection Tester
//!
//! Lightweight credential probe against the query gateway.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::live::{gateway_request, remote_error};
use crate::transport::HttpTransport;
use htap_common::{ConnectionConfig, HtapError};
use serde::Serialize;
use std::sync::Arc;

/// Query sent by the probe.
pub const PROBE_SQL: &str = "SELECT 1";

pub const PROBE_SUCCESS_MESSAGE: &str = "Connection successful";

/// Outcome of a connection probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionCheck {
    pub success: bool,
    pub message: String,
}

impl ConnectionCheck {
    fn ok() -> Self {
        Self {
            success: true,
            message: PROBE_SUCCESS_MESSAGE.to_string(),
        }
    }

    fn failed(error: &HtapError) -> Self {
        Self {
            success: false,
            message: error.message(),
        }
    }
}

/// Checks that the configured gateway accepts the configured keys.
#[derive(Clone)]
pub struct ConnectionTester {
    transport: Arc<dyn HttpTransport>,
}

impl ConnectionTester {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Probe the endpoint. Never fails; the outcome is in the returned value.
    pub async fn test(&self, config: &ConnectionConfig) -> ConnectionCheck {
        if !config.has_credentials() {
            return ConnectionCheck::failed(&HtapError::MissingCredentials);
        }

        let request = gateway_request(config, serde_json::json!({ "sql": PROBE_SQL }));
        let check = match self.transport.post_json(request).await {
            Ok(response) if response.is_success() => ConnectionCheck::ok(),
            Ok(response) => ConnectionCheck::failed(&remote_error(&response)),
            Err(e) => ConnectionCheck::failed(&e),
        };

        if check.success {
            tracing::info!("Gateway {} accepted credentials", config.endpoint);
        } else {
            tracing::warn!("Gateway probe failed: {}", check.message);
        }
        check
    }
}

// =============================================================================
// Tests
// =============================================================================
