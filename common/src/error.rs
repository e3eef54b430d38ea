use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::Endpoint;

/// Failures the scan engine distinguishes between.
///
/// Only `InvalidInput` is fatal. Everything else is recovered at the level
/// of a single target and turned into "unreachable" or "not verified".
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("network error on {endpoint}: {source}")]
    Network {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    #[error("unexpected response from {endpoint}: {reason}")]
    ProtocolMismatch { endpoint: Endpoint, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn network(endpoint: Endpoint, source: io::Error) -> Self {
        Self::Network { endpoint, source }
    }

    pub fn mismatch(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        Self::ProtocolMismatch {
            endpoint,
            reason: reason.into(),
        }
    }
}
