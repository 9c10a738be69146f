//! HTAP Config - Configuration Structures
//!
//! Session configuration for the gateway connection, the insight endpoint,
//! the query simulator and the refresh loop. Held in memory only; nothing
//! here is ever written to disk.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::error::{HtapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// =============================================================================
// Connection Configuration
// =============================================================================

/// Credentials and routing for the live query gateway.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub endpoint: String,
    pub public_key: String,
    pub private_key: String,
    /// Route queries to the gateway instead of the simulator.
    pub is_live: bool,
    pub host: Option<String>,
    pub port: Option<String>,
    pub user: Option<String>,
}

impl ConnectionConfig {
    /// Create a configuration for the given gateway endpoint and key pair.
    pub fn new(
        endpoint: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            public_key: public_key.into(),
            private_key: private_key.into(),
            ..Default::default()
        }
    }

    pub fn with_live(mut self, is_live: bool) -> Self {
        self.is_live = is_live;
        self
    }

    /// Set the display-only SQL client coordinates.
    pub fn with_sql_client(
        mut self,
        host: Option<String>,
        port: Option<String>,
        user: Option<String>,
    ) -> Self {
        self.host = host;
        self.port = port;
        self.user = user;
        self
    }

    /// True when endpoint and both keys are present.
    pub fn has_credentials(&self) -> bool {
        !self.endpoint.is_empty() && !self.public_key.is_empty() && !self.private_key.is_empty()
    }

    /// Render a `mysql` command line hint from the display-only fields.
    pub fn cli_hint(&self) -> Option<String> {
        let host = self.host.as_deref().filter(|h| !h.is_empty())?;
        let mut parts = vec!["mysql".to_string(), format!("-h {}", host)];

        if let Some(port) = self.port.as_deref().filter(|p| !p.is_empty()) {
            parts.push(format!("-P {}", port));
        }

        if let Some(user) = self.user.as_deref().filter(|u| !u.is_empty()) {
            parts.push(format!("-u '{}'", user));
        }

        parts.push("-p".to_string());
        Some(parts.join(" "))
    }
}

// Keys stay out of debug output.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint)
            .field("public_key", &redact(&self.public_key))
            .field("private_key", &redact(&self.private_key))
            .field("is_live", &self.is_live)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

// =============================================================================
// Insight Configuration
// =============================================================================

/// Settings for the generative text endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Base URL of the completion API, without the model path.
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: String::new(),
        }
    }
}

impl InsightConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Full URL of the content generation call.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl fmt::Debug for InsightConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

// =============================================================================
// Simulator Configuration
// =============================================================================

/// Artificial latency window applied to every simulated query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub min_latency: Duration,
    pub max_latency: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            min_latency: Duration::from_millis(300),
            max_latency: Duration::from_millis(800),
        }
    }
}

impl SimulatorConfig {
    /// No artificial delay at all.
    pub fn instant() -> Self {
        Self {
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
        }
    }
}

// =============================================================================
// Dashboard Configuration
// =============================================================================

/// Longest history the metric window, or a single refresh period, may span.
pub const MAX_METRIC_SPAN: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// Refresh loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub refresh_interval: Duration,
    /// Number of points kept in the rolling metric window.
    pub window: usize,
    pub sample_step: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(2),
            window: 20,
            sample_step: Duration::from_secs(2),
        }
    }
}

impl DashboardConfig {
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self.sample_step = interval;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval.is_zero() {
            return Err(HtapError::Configuration(
                "refresh interval must be greater than zero".to_string(),
            ));
        }
        if self.refresh_interval > MAX_METRIC_SPAN {
            return Err(HtapError::Configuration(format!(
                "refresh interval must not exceed {:?}",
                MAX_METRIC_SPAN
            )));
        }
        if self.sample_step.is_zero() {
            return Err(HtapError::Configuration(
                "sample step must be greater than zero".to_string(),
            ));
        }
        if self.window == 0 {
            return Err(HtapError::Configuration(
                "metric window must hold at least one point".to_string(),
            ));
        }

        let span = u32::try_from(self.window)
            .ok()
            .and_then(|points| self.sample_step.checked_mul(points));
        match span {
            Some(span) if span <= MAX_METRIC_SPAN => Ok(()),
            _ => Err(HtapError::Configuration(format!(
                "metric window of {} samples every {:?} spans more than {:?}",
                self.window, self.sample_step, MAX_METRIC_SPAN
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_credentials() {
        let config = ConnectionConfig::new("https://gw.example.com/sql", "pub", "priv");
        assert!(config.has_credentials());

        let config = ConnectionConfig::new("https://gw.example.com/sql", "", "priv");
        assert!(!config.has_credentials());

        assert!(!ConnectionConfig::default().has_credentials());
    }

    #[test]
    fn test_cli_hint() {
        let config = ConnectionConfig::default().with_sql_client(
            Some("gateway01.example.com".to_string()),
            Some("4000".to_string()),
            Some("root".to_string()),
        );
        assert_eq!(
            config.cli_hint().as_deref(),
            Some("mysql -h gateway01.example.com -P 4000 -u 'root' -p")
        );

        assert_eq!(ConnectionConfig::default().cli_hint(), None);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = ConnectionConfig::new("https://gw", "public-abc", "private-xyz");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("public-abc"));
        assert!(!debug.contains("private-xyz"));
        assert!(debug.contains("https://gw"));
    }

    #[test]
    fn test_insight_url() {
        let config = InsightConfig::new("key")
            .with_endpoint("http://127.0.0.1:9000/v1beta/")
            .with_model("test-model");
        assert_eq!(
            config.generate_url(),
            "http://127.0.0.1:9000/v1beta/models/test-model:generateContent"
        );
    }

    #[test]
    fn test_simulator_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.min_latency, Duration::from_millis(300));
        assert_eq!(config.max_latency, Duration::from_millis(800));
    }

    #[test]
    fn test_dashboard_window_floor() {
        let config = DashboardConfig::default().with_window(0);
        assert_eq!(config.window, 1);
    }

    #[test]
    fn test_dashboard_validate() {
        assert!(DashboardConfig::default().validate().is_ok());

        let zero = DashboardConfig::default().with_refresh_interval(Duration::ZERO);
        let err = zero.validate().unwrap_err();
        assert!(err.is_local());
        assert_eq!(err.message(), "refresh interval must be greater than zero");
    }

    #[test]
    fn test_dashboard_validate_upper_bound() {
        let huge = DashboardConfig::default()
            .with_refresh_interval(Duration::from_millis(1_000_000_000_000_000));
        assert!(matches!(huge.validate(), Err(HtapError::Configuration(_))));

        // A one-hour step is fine alone but not across a 10,000 point window.
        let hourly = DashboardConfig::default().with_refresh_interval(Duration::from_secs(3600));
        assert!(hourly.validate().is_ok());
        assert!(hourly.with_window(10_000).validate().is_err());

        let zero_step = DashboardConfig {
            sample_step: Duration::ZERO,
            ..DashboardConfig::default()
        };
        assert!(zero_step.validate().is_err());
    }
}
