use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::TxStatus;

/// Interval used when none (or zero) is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Decides after each observed status whether polling continues.
pub type Predicate = Arc<dyn Fn(TxStatus) -> bool + Send + Sync>;

/// Keep polling while the transaction is pending.
pub fn default_predicate(status: TxStatus) -> bool {
    status == TxStatus::Pending
}

/// Polling configuration. Unset fields fall back to the defaults when a poll starts.
#[derive(Clone, Default)]
pub struct PollingOptions {
    pub interval: Option<Duration>,
    pub predicate: Option<Predicate>,
}

impl PollingOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_predicate(
        mut self,
        predicate: impl Fn(TxStatus) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Fill unset or zero fields with the defaults, without touching `self`.
    pub(crate) fn resolve(&self) -> ResolvedOptions {
        let interval = match self.interval {
            Some(interval) if !interval.is_zero() => interval,
            _ => DEFAULT_INTERVAL,
        };
        let predicate = self
            .predicate
            .clone()
            .unwrap_or_else(|| Arc::new(default_predicate));
        ResolvedOptions {
            interval,
            predicate,
        }
    }
}

impl fmt::Debug for PollingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingOptions")
            .field("interval", &self.interval)
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

pub(crate) struct ResolvedOptions {
    pub interval: Duration,
    pub predicate: Predicate,
}
