//! HTAP Common - Shared Types and Configuration
//!
//! Foundational types used across the dashboard crates: the query result
//! shape returned by both the simulator and the live gateway client, the
//! cluster gauges, generated insights, the error taxonomy and the session
//! configuration.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConnectionConfig, DashboardConfig, InsightConfig, SimulatorConfig};
pub use error::{HtapError, Result, MISSING_CREDENTIALS_MESSAGE};
pub use types::*;
