//! HTAP Query Console
//!
//! Routes a SQL string to the live gateway or the simulator depending on
//! the session's live flag.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::live::LiveQueryClient;
use crate::simulator::Simulator;
use crate::tester::{ConnectionCheck, ConnectionTester};
use crate::transport::HttpTransport;
use htap_common::{ConnectionConfig, QueryResult, SimulatorConfig};
use std::sync::Arc;

/// Dispatches queries between the live gateway and the simulator.
#[derive(Clone)]
pub struct QueryConsole {
    simulator: Simulator,
    live: LiveQueryClient,
    tester: ConnectionTester,
}

impl QueryConsole {
    pub fn new(transport: Arc<dyn HttpTransport>, simulator: SimulatorConfig) -> Self {
        Self {
            simulator: Simulator::new(simulator),
            live: LiveQueryClient::new(transport.clone()),
            tester: ConnectionTester::new(transport),
        }
    }

    /// Run `sql` on whichever backend `config` selects.
    pub async fn run(&self, config: &ConnectionConfig, sql: &str) -> QueryResult {
        if config.is_live {
            tracing::debug!("Dispatching query to live gateway {}", config.endpoint);
            self.live.execute(config, sql).await
        } else {
            tracing::debug!("Dispatching query to simulator");
            self.simulator.simulate(sql).await
        }
    }

    pub async fn test_connection(&self, config: &ConnectionConfig) -> ConnectionCheck {
        self.tester.test(config).await
    }
}

// =============================================================================
// Tests
// =============================================================================
