//! Core domain types for the transaction client.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Status of a transaction as tracked by the client.
///
/// `Init` only exists locally: the remote never reports it, and decoding it
/// from a status response fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxStatus {
    /// Constructed, not yet broadcast.
    #[default]
    #[serde(skip_deserializing)]
    Init,
    /// Broadcast accepted, awaiting confirmation.
    Pending,
    /// Settled.
    Confirmed,
    /// Rejected.
    Failed,
    /// Unknown to the remote service.
    #[serde(rename = "DNE")]
    Dne,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Init => "INIT",
            TxStatus::Pending => "PENDING",
            TxStatus::Confirmed => "CONFIRMED",
            TxStatus::Failed => "FAILED",
            TxStatus::Dne => "DNE",
        }
    }

    /// `Confirmed`, `Failed` and `Dne` are final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Confirmed | TxStatus::Failed | TxStatus::Dne)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required transaction fields, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxField {
    Symbol,
    Price,
    Timestamp,
}

impl fmt::Display for TxField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxField::Symbol => f.write_str("symbol"),
            TxField::Price => f.write_str("price"),
            TxField::Timestamp => f.write_str("timestamp"),
        }
    }
}

/// Returned by [`Transaction::new`] when required fields are empty or zero.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing required transaction fields: {}", join_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<TxField>,
}

fn join_fields(fields: &[TxField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A transaction submitted to the remote service.
///
/// `symbol`, `price` and `timestamp` are fixed at creation and make up the
/// broadcast payload. `hash` and `status` can only be changed by the
/// [`Client`](crate::Client): the hash is assigned once on broadcast, the
/// status follows `INIT -> PENDING -> {CONFIRMED, FAILED, DNE}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    symbol: String,
    price: u64,
    timestamp: u64,

    #[serde(skip)]
    hash: String,
    #[serde(skip)]
    status: TxStatus,
}

impl Transaction {
    /// Validate the inputs and create a transaction in the `Init` state.
    pub fn new(
        symbol: impl Into<String>,
        price: u64,
        timestamp: u64,
    ) -> Result<Self, ValidationError> {
        let symbol = symbol.into();

        let mut missing = Vec::new();
        if symbol.is_empty() {
            missing.push(TxField::Symbol);
        }
        if price == 0 {
            missing.push(TxField::Price);
        }
        if timestamp == 0 {
            missing.push(TxField::Timestamp);
        }
        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(Self {
            symbol,
            price,
            timestamp,
            hash: String::new(),
            status: TxStatus::Init,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Hash assigned by the remote on broadcast, empty before that.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn status(&self) -> TxStatus {
        self.status
    }

    /// Record an accepted broadcast: `Init -> Pending` with the assigned hash.
    pub(crate) fn mark_broadcast(&mut self, hash: String) {
        debug_assert_eq!(self.status, TxStatus::Init);
        debug_assert!(!hash.is_empty());
        self.hash = hash;
        self.status = TxStatus::Pending;
    }

    /// Apply a status reported by the remote. The remote is authoritative.
    pub(crate) fn set_status(&mut self, status: TxStatus) {
        debug_assert!(!self.hash.is_empty());
        self.status = status;
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hash = if self.hash.is_empty() { "-" } else { &self.hash };
        write!(
            f,
            "{} {} {} {} {}",
            self.symbol, self.price, self.timestamp, hash, self.status
        )
    }
}
