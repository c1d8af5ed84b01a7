//! Owned handle for the background token renewal timer.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Access tokens issued by the backend stay valid for ~30 minutes.
const TOKEN_LIFETIME_MINUTES: u64 = 30;

/// Renew this many minutes before the lifetime elapses.
/// 5 minutes absorbs clock drift and request latency.
const RENEWAL_LEAD_MINUTES: u64 = 5;

/// Delay between renewal attempts: the 25-minute mark of a 30-minute token
/// lifetime.
pub(crate) fn renewal_interval() -> Duration {
    Duration::from_secs((TOKEN_LIFETIME_MINUTES - RENEWAL_LEAD_MINUTES) * 60)
}

/// At most one timer is live per session: arming always disarms first, and
/// the session manager disarms on logout and on a failed renewal.
#[derive(Debug, Default)]
pub(crate) struct RenewalScheduler {
    handle: Option<JoinHandle<()>>,
}

impl RenewalScheduler {
    pub(crate) fn arm(&mut self, handle: JoinHandle<()>) {
        self.disarm();
        self.handle = Some(handle);
    }

    /// Abort the live timer, if any.
    pub(crate) fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Drop the handle without aborting. The renewal task uses this on its
    /// own failure path: aborting the task it is running on would cut the
    /// remaining cleanup short at the next await point.
    pub(crate) fn release(&mut self) {
        self.handle = None;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for RenewalScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}
