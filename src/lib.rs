pub mod client;
pub mod model;
pub mod transport;

pub use client::{Client, ClientError, PollingOptions};
pub use model::{Transaction, TxField, TxStatus, ValidationError};
pub use transport::{HttpTransport, Transport};
