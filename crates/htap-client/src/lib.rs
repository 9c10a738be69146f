//! HTAP Client - Dashboard Query and Insight Clients
//!
//! Everything the dashboard calls into: the engine classifier, the mock
//! query simulator and metric generator, the live query gateway client,
//! the connection tester, the generative insight client, and the
//! snapshot-based dashboard state.
//!
//! Key Features:
//! - One shared classifier for simulated and live queries
//! - Swappable HTTP transport for tests
//! - Value-level failure reporting, no client call returns an error
//! - Timer-driven refresh publishing immutable snapshots
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod auth;
pub mod classifier;
pub mod console;
pub mod generator;
pub mod insight;
pub mod live;
pub mod simulator;
pub mod state;
pub mod tester;
pub mod transport;

#[cfg(test)]
mod mock;

pub use classifier::classify;
pub use console::QueryConsole;
pub use generator::MetricGenerator;
pub use insight::{fallback_insight, InsightClient};
pub use live::LiveQueryClient;
pub use simulator::Simulator;
pub use state::{Dashboard, DashboardState, QueryTicket};
pub use tester::{ConnectionCheck, ConnectionTester};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

pub use htap_common::{
    ClusterStatus, ConnectionConfig, DashboardConfig, Engine, HtapError, Insight, InsightConfig,
    QueryResult, Row, Severity, SimulatorConfig, Value,
};

// =============================================================================
// Tests
// =============================================================================
