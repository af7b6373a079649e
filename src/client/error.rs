//! Error types for broadcasting and polling.

use thiserror::Error;

use crate::transport::TransportError;

/// Error returned by [`Client`](super::Client) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transaction was already broadcast")]
    AlreadyBroadcast,

    #[error("transaction hash not found")]
    HashNotFound,

    #[error("unexpected response status {status} from {url}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to encode transaction")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        source: TransportError,
    },
}
