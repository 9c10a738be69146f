//! HTAP Error - Unified Error Types
//!
//! Error taxonomy for every externally-facing dashboard operation. Client
//! operations fold these into value-level results at their own boundary,
//! so callers mostly see them as the `error` text of a query result.
//!
//! Key Features:
//! - One variant per failure category (local, transport, remote, parse)
//! - Bare message extraction for display in result payloads
//! - Local vs remote error classification
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use thiserror::Error;

/// Message reported when connection credentials are incomplete.
pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Missing credentials: endpoint, public key and private key are required";

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for dashboard operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HtapError {
    /// Local precondition failure, never reaches the network.
    #[error("{}", MISSING_CREDENTIALS_MESSAGE)]
    MissingCredentials,

    /// Network or connection failure from an external call.
    #[error("transport error: {0}")]
    Transport(String),

    /// Well-formed error response from an external endpoint.
    #[error("remote error [{status}]: {message}")]
    Remote { status: u16, message: String },

    /// Malformed or unexpected response shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration supplied by the operator.
    #[error("configuration error: {0}")]
    Configuration(String),
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, HtapError>;

// =============================================================================
// Error Classification
// =============================================================================

impl HtapError {
    /// The bare message carried by the error, without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::MissingCredentials => MISSING_CREDENTIALS_MESSAGE.to_string(),
            Self::Transport(msg) | Self::Parse(msg) | Self::Configuration(msg) => msg.clone(),
            Self::Remote { message, .. } => message.clone(),
        }
    }

    /// Returns true if the failure happened before any network traffic.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::MissingCredentials | Self::Configuration(_))
    }

    /// Returns true if the remote side answered with an error.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl From<serde_json::Error> for HtapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
