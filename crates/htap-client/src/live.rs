//! HTAP Live Query Client
//!
//! Sends SQL to the cloud query gateway and reshapes the reply into the
//! same [`QueryResult`] the simulator produces. The gateway does not say
//! which engine served the query, so the engine is classified locally.
//!
//! Every failure ends up in the result's `error` field; `execute` never
//! returns an `Err` and never panics on bad input.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::auth::basic_authorization;
use crate::classifier::classify;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use htap_common::{ConnectionConfig, HtapError, QueryResult, Result, Row, Value};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    result: GatewayResult,
}

#[derive(Debug, Deserialize)]
struct GatewayResult {
    columns: Vec<GatewayColumn>,
    #[serde(default)]
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct GatewayColumn {
    name: String,
}

// =============================================================================
// Live Query Client
// =============================================================================

/// Client for the remote query gateway.
#[derive(Clone)]
pub struct LiveQueryClient {
    transport: Arc<dyn HttpTransport>,
}

impl LiveQueryClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Run `sql` against the gateway named by `config`.
    pub async fn execute(&self, config: &ConnectionConfig, sql: &str) -> QueryResult {
        if !config.has_credentials() {
            tracing::warn!("Live query rejected: incomplete credentials");
            return QueryResult::failed(sql, HtapError::MissingCredentials.message());
        }

        let start = Instant::now();
        match self.send(config, sql).await {
            Ok((columns, rows)) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                let engine = classify(sql);
                tracing::debug!(
                    "Live query returned {} rows in {:.1}ms (engine={})",
                    rows.len(),
                    elapsed_ms,
                    engine
                );
                QueryResult::new(sql, engine, columns, rows, elapsed_ms)
            }
            Err(e) if e.is_remote() => {
                tracing::warn!("Gateway rejected query: {}", e);
                QueryResult::failed(sql, e.message())
            }
            Err(e) => {
                tracing::warn!("Live query failed: {}", e);
                QueryResult::failed(sql, e.message())
            }
        }
    }

    async fn send(&self, config: &ConnectionConfig, sql: &str) -> Result<(Vec<String>, Vec<Row>)> {
        let request = gateway_request(config, serde_json::json!({ "sql": sql }));
        let response = self.transport.post_json(request).await?;

        if !response.is_success() {
            return Err(remote_error(&response));
        }

        parse_result(&response)
    }
}

/// Build an authenticated POST to the gateway endpoint.
pub(crate) fn gateway_request(config: &ConnectionConfig, body: serde_json::Value) -> HttpRequest {
    HttpRequest::post(config.endpoint.clone(), body)
        .header(
            "Authorization",
            basic_authorization(&config.public_key, &config.private_key),
        )
        .header("Content-Type", "application/json")
}

/// Map a non-2xx response to an error, preferring the server's message.
pub(crate) fn remote_error(response: &HttpResponse) -> HtapError {
    let message = response
        .error_message()
        .unwrap_or_else(|| format!("Request failed with status {}", response.status));

    HtapError::Remote {
        status: response.status,
        message,
    }
}

fn parse_result(response: &HttpResponse) -> Result<(Vec<String>, Vec<Row>)> {
    let response: GatewayResponse = response.json()?;
    let columns: Vec<String> = response
        .result
        .columns
        .into_iter()
        .map(|c| c.name)
        .collect();

    let rows = response
        .result
        .rows
        .into_iter()
        .map(|record| order_record(&columns, record))
        .collect();

    Ok((columns, rows))
}

/// Lay a JSON record out in column order. Keys the column list does not
/// mention are appended after the declared columns.
fn order_record(columns: &[String], mut record: serde_json::Map<String, serde_json::Value>) -> Row {
    let mut row = Row::new();
    for column in columns {
        let value = record.remove(column).map(Value::from_json).unwrap_or(Value::Null);
        row.insert(column.clone(), value);
    }
    for (column, value) in record {
        row.insert(column, Value::from_json(value));
    }
    row
}

// =============================================================================
// Tests
// =============================================================================
