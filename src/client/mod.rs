//! Broadcast and polling client.
//!
//! The client submits a [`Transaction`] to the broadcast endpoint, then polls
//! the status endpoint on a fixed interval until the continuation predicate
//! says stop, a request fails, or the caller cancels.
//!
//! The client never owns the transaction. Only one `broadcast` or `poll` call
//! may be in flight per transaction at a time, which `&mut` borrows enforce.

use reqwest::Url;
use serde::Deserialize;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::model::{Transaction, TxStatus};
use crate::transport::{HttpTransport, Response, Transport};

mod options;
pub use options::{DEFAULT_INTERVAL, PollingOptions, Predicate, default_predicate};

mod error;
pub use error::ClientError;

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    #[serde(default)]
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    tx_status: TxStatus,
}

/// Client for a broadcast endpoint and a base polling endpoint.
pub struct Client<T = HttpTransport> {
    broadcast_url: Url,
    polling_url: Url,
    options: PollingOptions,
    transport: T,
}

impl Client<HttpTransport> {
    /// Create a client talking HTTP with the default polling options.
    pub fn new(broadcast_url: &str, polling_url: &str) -> Result<Self, ClientError> {
        Self::with_transport(broadcast_url, polling_url, HttpTransport::default())
    }
}

/// Public API
impl<T: Transport> Client<T> {
    pub fn with_transport(
        broadcast_url: &str,
        polling_url: &str,
        transport: T,
    ) -> Result<Self, ClientError> {
        let broadcast_url = parse_url(broadcast_url)?;
        let polling_url = parse_url(polling_url)?;
        if polling_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: polling_url.to_string(),
                reason: "polling url cannot take path segments".to_string(),
            });
        }

        Ok(Self {
            broadcast_url,
            polling_url,
            options: PollingOptions::default(),
            transport,
        })
    }

    /// Replace the polling options used by [`Client::poll`].
    pub fn with_options(mut self, options: PollingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PollingOptions {
        &self.options
    }

    /// Submit the transaction. On success the transaction holds the hash
    /// returned by the remote and is `Pending`.
    ///
    /// Fails with [`ClientError::AlreadyBroadcast`] unless the transaction is
    /// still `Init`. On any error the transaction is left untouched.
    pub async fn broadcast(&self, tx: &mut Transaction) -> Result<(), ClientError> {
        if tx.status() != TxStatus::Init {
            return Err(ClientError::AlreadyBroadcast);
        }

        let body = serde_json::to_vec(&*tx).map_err(ClientError::Encode)?;
        let url = &self.broadcast_url;
        let res = self
            .transport
            .post_json(url, body)
            .await
            .map_err(|source| {
                warn!(url = %url, error = %source, "broadcast request failed");
                ClientError::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;
        check_status(url, &res)?;

        let BroadcastResponse { tx_hash } = decode(url, &res)?;
        if tx_hash.is_empty() {
            return Err(ClientError::HashNotFound);
        }

        info!(symbol = tx.symbol(), hash = %tx_hash, "transaction broadcast");
        tx.mark_broadcast(tx_hash);
        Ok(())
    }

    /// Poll with the client's options. See [`Client::poll_with`].
    pub async fn poll(
        &self,
        cancel: &CancellationToken,
        tx: &mut Transaction,
    ) -> Result<(), ClientError> {
        self.poll_with(cancel, tx, &self.options).await
    }

    /// Query the transaction status once per interval, until the predicate
    /// returns `false` for the latest status.
    ///
    /// The first query happens one interval after the call. Cancellation
    /// returns `Ok(())` and leaves the status at its last observed value. A
    /// failed query ends polling with the error, the status is not touched.
    pub async fn poll_with(
        &self,
        cancel: &CancellationToken,
        tx: &mut Transaction,
        options: &PollingOptions,
    ) -> Result<(), ClientError> {
        let options = options.resolve();

        if tx.hash().is_empty() {
            return Err(ClientError::HashNotFound);
        }
        let url = self.poll_target(tx.hash())?;

        let mut ticker = time::interval_at(Instant::now() + options.interval, options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(hash = tx.hash(), status = %tx.status(), "polling cancelled");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            let status = self.query_status(&url).await?;
            tx.set_status(status);
            debug!(hash = tx.hash(), status = %status, "status received");

            if !(options.predicate)(status) {
                info!(hash = tx.hash(), status = %status, "polling finished");
                return Ok(());
            }
        }
    }
}

/// Private API
impl<T: Transport> Client<T> {
    /// Polling url with the hash appended as a path segment
    fn poll_target(&self, hash: &str) -> Result<Url, ClientError> {
        let mut url = self.polling_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.polling_url.to_string(),
                reason: "polling url cannot take path segments".to_string(),
            })?
            .pop_if_empty()
            .push(hash);
        Ok(url)
    }

    async fn query_status(&self, url: &Url) -> Result<TxStatus, ClientError> {
        let res = self.transport.get(url).await.map_err(|source| {
            warn!(url = %url, error = %source, "status request failed");
            ClientError::Transport {
                url: url.to_string(),
                source,
            }
        })?;
        check_status(url, &res)?;

        let StatusResponse { tx_status } = decode(url, &res)?;
        Ok(tx_status)
    }
}

fn parse_url(url: &str) -> Result<Url, ClientError> {
    Url::parse(url).map_err(|e| ClientError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn check_status(url: &Url, res: &Response) -> Result<(), ClientError> {
    if res.is_ok() {
        return Ok(());
    }
    let body = String::from_utf8_lossy(&res.body).into_owned();
    error!(url = %url, status = res.status, body = %body, "unexpected response status");
    Err(ClientError::UnexpectedStatus {
        url: url.to_string(),
        status: res.status,
        body,
    })
}

fn decode<'a, R: Deserialize<'a>>(url: &Url, res: &'a Response) -> Result<R, ClientError> {
    serde_json::from_slice(&res.body).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}
