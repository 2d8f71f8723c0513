use futures::FutureExt;
use futures::future::Shared;
use parking_lot::Mutex;

use super::traits::BoxFuture;
use crate::error::RenewalFailure;

pub(crate) type RenewalOutcome = Result<(), RenewalFailure>;
pub(crate) type SharedRenewal = Shared<BoxFuture<'static, RenewalOutcome>>;

/// Single-slot marker for the one renewal allowed in flight per client.
///
/// Test-and-set under the lock: the first caller to observe an expiry
/// installs the renewal, every later caller clones and awaits it. The
/// renewal future empties the slot itself before yielding its outcome, so
/// no waiter can resume while the slot still points at a settled renewal.
///
/// A detached task drives the renewal to completion, so it settles (and the
/// slot empties) even when every waiter has been dropped.
#[derive(Default)]
pub(crate) struct RenewalSlot {
    current: Mutex<Option<SharedRenewal>>,
}

impl RenewalSlot {
    /// Join the renewal in flight, or install the one built by `start`.
    ///
    /// Returns the shared renewal and whether this call started it.
    pub(crate) fn join_or_start<F>(&self, start: F) -> (SharedRenewal, bool)
    where
        F: FnOnce() -> BoxFuture<'static, RenewalOutcome>,
    {
        let mut current = self.current.lock();
        if let Some(existing) = current.as_ref() {
            return (existing.clone(), false);
        }
        let renewal = start().shared();
        *current = Some(renewal.clone());
        drive_detached(renewal.clone());
        (renewal, true)
    }

    pub(crate) fn clear(&self) {
        self.current.lock().take();
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.current.lock().is_some()
    }
}

/// Poll the renewal on the current runtime independently of its waiters.
///
/// Outside a tokio runtime the waiters drive it, as any shared future.
fn drive_detached(renewal: SharedRenewal) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(renewal);
        }
        Err(_) => tracing::debug!("No tokio runtime, renewal is driven by its waiters"),
    }
}
