//! Cancellation and deadline handling for the blocking waits
//!
//! Every loop that waits on the provider (instance start-up, DNS
//! propagation, the termination grace period) sleeps through
//! [`WaitOptions::sleep`], so a caller can bound or abort it.

use crate::error::{CloudError, Result};
use std::time::Duration;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;

/// Default interval between instance state checks (the provider waiter cadence)
pub const DEFAULT_INSTANCE_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Default interval between DNS change status checks
pub const DEFAULT_DNS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default delay between resolving instances to terminate and acting on them
pub const DEFAULT_TERMINATION_GRACE: Duration = Duration::from_secs(10);

/// Cancellation token plus optional absolute deadline
///
/// The default never cancels and never times out, so waits run until the
/// provider reports the awaited state.
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up once `timeout` has elapsed from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Sleep for `interval` unless cancelled first or the deadline falls
    /// inside the interval.
    ///
    /// `waiting_for` names the awaited condition in the resulting error.
    pub async fn sleep(&self, interval: Duration, waiting_for: &str) -> Result<()> {
        let cancelled = || CloudError::Cancelled(waiting_for.to_string());
        if self.cancel.is_cancelled() {
            return Err(cancelled());
        }

        let wake = Instant::now() + interval;
        match self.deadline {
            Some(deadline) if deadline <= wake => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(cancelled()),
                    _ = sleep_until(deadline) => Err(CloudError::Timeout(waiting_for.to_string())),
                }
            }
            _ => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(cancelled()),
                    _ = sleep(interval) => Ok(()),
                }
            }
        }
    }
}
