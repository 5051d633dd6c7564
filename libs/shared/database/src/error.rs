use std::time::Duration;

use thiserror::Error;

/// Failure of a single call to the remote store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Remote store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not reach the remote store: {0}")]
    Network(String),

    #[error("Unexpected response from the remote store: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Timeout { .. })
    }
}
