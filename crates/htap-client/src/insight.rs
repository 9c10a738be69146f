//! HTAP Insight Client
//!
//! Asks a generative text endpoint for a short structured assessment of
//! the current cluster gauges. Any failure yields the fixed fallback
//! insight, so the dashboard always has something to show.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::live::remote_error;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use htap_common::{ClusterStatus, HtapError, Insight, InsightConfig, Result, Severity};
use serde::Deserialize;
use std::sync::Arc;

pub const FALLBACK_TITLE: &str = "System Nominal";
pub const FALLBACK_CONTENT: &str = "All cluster gauges are within expected ranges.";
pub const FALLBACK_RECOMMENDATION: &str = "Continue monitoring replication lag and query throughput.";

/// The insight returned whenever generation fails.
pub fn fallback_insight() -> Insight {
    Insight {
        title: FALLBACK_TITLE.to_string(),
        content: FALLBACK_CONTENT.to_string(),
        recommendation: FALLBACK_RECOMMENDATION.to_string(),
        severity: Severity::Low,
    }
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Build the natural-language prompt for a status snapshot.
pub fn build_prompt(status: &ClusterStatus) -> String {
    format!(
        "You are monitoring a hybrid transactional/analytical database cluster. \
         Current status: {} regions, {} replicas, replication sync lag {:.1} ms, \
         transactional throughput {:.0} QPS, analytical throughput {:.0} QPS. \
         Give one short insight about cluster health as JSON with the fields \
         title, content, recommendation and severity (one of low, medium, high).",
        status.region_count, status.replica_count, status.sync_lag_ms, status.tp_qps, status.ap_qps
    )
}

fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "content": { "type": "STRING" },
            "recommendation": { "type": "STRING" },
            "severity": { "type": "STRING", "enum": ["low", "medium", "high"] }
        },
        "required": ["title", "content", "recommendation", "severity"]
    })
}

// =============================================================================
// Insight Client
// =============================================================================

#[derive(Clone)]
pub struct InsightClient {
    transport: Arc<dyn HttpTransport>,
    config: InsightConfig,
}

impl InsightClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: InsightConfig) -> Self {
        Self { transport, config }
    }

    /// Generate an insight for `status`, or the fallback on any failure.
    pub async fn get_insights(&self, status: &ClusterStatus) -> Insight {
        if self.config.api_key.is_empty() {
            tracing::debug!("No insight API key configured, using fallback insight");
            return fallback_insight();
        }

        match self.generate(status).await {
            Ok(insight) => insight,
            Err(e) => {
                tracing::warn!("Insight generation failed: {}", e);
                fallback_insight()
            }
        }
    }

    async fn generate(&self, status: &ClusterStatus) -> Result<Insight> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": build_prompt(status) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        });

        let request = HttpRequest::post(self.config.generate_url(), body)
            .header("x-goog-api-key", self.config.api_key.clone())
            .header("Content-Type", "application/json");

        let response = self.transport.post_json(request).await?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }

        let text = completion_text(&response)?;
        parse_insight(&text)
    }
}

fn completion_text(response: &HttpResponse) -> Result<String> {
    let response: GenerateResponse = response.json()?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| HtapError::Parse("completion contained no text".to_string()))
}

/// Parse completion text into an insight. All four fields are required.
pub fn parse_insight(text: &str) -> Result<Insight> {
    serde_json::from_str(text.trim()).map_err(HtapError::from)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    fn status() -> ClusterStatus {
        ClusterStatus {
            region_count: 3,
            replica_count: 9,
            sync_lag_ms: 12.5,
            tp_qps: 15000.0,
            ap_qps: 420.0,
        }
    }

    fn completion(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    fn client(transport: &Arc<MockTransport>) -> InsightClient {
        InsightClient::new(transport.clone(), InsightConfig::new("test-key"))
    }

    #[tokio::test]
    async fn test_parses_generated_insight() {
        let text = r#"{"title":"Lag rising","content":"Sync lag is elevated.","recommendation":"Add a replica.","severity":"medium"}"#;
        let transport = Arc::new(MockTransport::responding(200, completion(text)));

        let insight = client(&transport).get_insights(&status()).await;

        assert_eq!(insight.title, "Lag rising");
        assert_eq!(insight.severity, Severity::Medium);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_gives_fallback() {
        let transport = Arc::new(MockTransport::responding(200, completion("{not json")));
        let insight = client(&transport).get_insights(&status()).await;

        assert_eq!(insight, fallback_insight());
        assert_eq!(insight.severity, Severity::Low);
        assert_eq!(insight.title, FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn test_missing_field_gives_fallback() {
        let text = r#"{"title":"x","content":"y","severity":"low"}"#;
        let transport = Arc::new(MockTransport::responding(200, completion(text)));
        assert_eq!(client(&transport).get_insights(&status()).await, fallback_insight());
    }

    #[tokio::test]
    async fn test_unknown_severity_gives_fallback() {
        let text = r#"{"title":"x","content":"y","recommendation":"z","severity":"critical"}"#;
        let transport = Arc::new(MockTransport::responding(200, completion(text)));
        assert_eq!(client(&transport).get_insights(&status()).await, fallback_insight());
    }

    #[tokio::test]
    async fn test_transport_and_remote_failures_give_fallback() {
        let transport = Arc::new(MockTransport::failing("timed out"));
        assert_eq!(client(&transport).get_insights(&status()).await, fallback_insight());

        let transport = Arc::new(MockTransport::responding(429, r#"{"message":"quota"}"#));
        assert_eq!(client(&transport).get_insights(&status()).await, fallback_insight());

        let transport = Arc::new(MockTransport::responding(200, r#"{"candidates":[]}"#));
        assert_eq!(client(&transport).get_insights(&status()).await, fallback_insight());
    }

    #[tokio::test]
    async fn test_no_api_key_skips_network() {
        let transport = Arc::new(MockTransport::responding(200, completion("{}")));
        let insight = InsightClient::new(transport.clone(), InsightConfig::default())
            .get_insights(&status())
            .await;

        assert_eq!(insight, fallback_insight());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_request_carries_prompt_and_schema() {
        let transport = Arc::new(MockTransport::responding(200, completion("{}")));
        client(&transport).get_insights(&status()).await;

        let request = transport.last_request().unwrap();
        assert!(request.url.ends_with(":generateContent"));
        assert_eq!(request.header_value("x-goog-api-key"), Some("test-key"));

        let prompt = request.body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("3 regions"));
        assert!(prompt.contains("9 replicas"));
        assert!(prompt.contains("12.5 ms"));
        assert!(prompt.contains("15000"));
        assert!(prompt.contains("420"));

        let required = &request.body["generationConfig"]["responseSchema"]["required"];
        assert_eq!(
            required,
            &serde_json::json!(["title", "content", "recommendation", "severity"])
        );
    }
}
