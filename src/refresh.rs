//! Single-flight session refresh coordination.
//!
//! The coordinator only tracks *whether* a refresh is running and who is
//! waiting for it; the refresh request itself is issued by the call that
//! claimed it through [`RefreshCoordinator::try_begin`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// Result of a completed session refresh, as seen by waiters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshOutcome {
    Refreshed,
    Failed,
}

#[derive(Debug, Default)]
struct CoordinatorState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<CoordinatorState>,
}

impl RefreshCoordinator {
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the refresh. Returns `None` when another call already owns it.
    ///
    /// The flag is set before the caller gets a chance to dispatch the
    /// refresh request.
    pub(crate) fn try_begin(self: &Arc<Self>) -> Option<RefreshGuard> {
        let mut state = self.lock();
        if state.in_flight {
            return None;
        }
        state.in_flight = true;
        Some(RefreshGuard {
            coordinator: Arc::clone(self),
            finished: false,
        })
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        self.lock().in_flight
    }

    /// Registers a waiter for the in-flight refresh, if any.
    pub(crate) fn subscribe(&self) -> Option<oneshot::Receiver<RefreshOutcome>> {
        let mut state = self.lock();
        if !state.in_flight {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        state.waiters.push(tx);
        Some(rx)
    }

    fn complete(&self, outcome: RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        let count = waiters.len();
        for waiter in waiters {
            // A waiter that stopped listening is not an error.
            let _ = waiter.send(outcome);
        }
        count
    }
}

/// Ownership of the in-flight refresh.
///
/// Dropping the guard without calling [`RefreshGuard::finish`] releases the
/// coordinator and reports [`RefreshOutcome::Failed`] to waiters.
#[derive(Debug)]
pub(crate) struct RefreshGuard {
    coordinator: Arc<RefreshCoordinator>,
    finished: bool,
}

impl RefreshGuard {
    /// Returns to idle and notifies waiters in registration order.
    pub(crate) fn finish(mut self, outcome: RefreshOutcome) -> usize {
        self.finished = true;
        self.coordinator.complete(outcome)
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.coordinator.complete(RefreshOutcome::Failed);
        }
    }
}
