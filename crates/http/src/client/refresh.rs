//! Single-flight coordination of session refreshes
//!
//! The first request to see an expired token leads the refresh; requests
//! failing while it is in flight queue up and receive the leader's outcome.
//! The queue is drained in enqueue order, all at once, when the leader
//! settles.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use super::error::RefreshError;

pub(crate) type RefreshOutcome = Result<String, RefreshError>;

#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

#[derive(Debug, Default)]
struct RefreshState {
    in_progress: bool,
    queue: Vec<PendingRefresh>,
}

/// A request suspended until the in-flight refresh settles
#[derive(Debug)]
struct PendingRefresh {
    reply: oneshot::Sender<RefreshOutcome>,
}

/// Role a caller plays in the current refresh
pub(crate) enum RefreshTicket<'a> {
    /// No refresh was running; the caller must perform it and settle
    Lead(RefreshLead<'a>),
    /// A refresh is already running; await its outcome
    Wait(RefreshWait),
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Join the current refresh, or start one if none is running
    pub(crate) fn begin(&self) -> RefreshTicket<'_> {
        let mut state = self.lock();
        if state.in_progress {
            let (reply, rx) = oneshot::channel();
            state.queue.push(PendingRefresh { reply });
            RefreshTicket::Wait(RefreshWait { rx })
        } else {
            state.in_progress = true;
            RefreshTicket::Lead(RefreshLead {
                coordinator: self,
                settled: false,
            })
        }
    }

    fn settle(&self, outcome: &RefreshOutcome) {
        let queue = {
            let mut state = self.lock();
            state.in_progress = false;
            std::mem::take(&mut state.queue)
        };

        for pending in queue {
            // The waiter may have been dropped; nobody is left to tell.
            let _ = pending.reply.send(outcome.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        let state = self.lock();
        !state.in_progress && state.queue.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn queued(&self) -> usize {
        self.lock().queue.len()
    }
}

/// Obligation to settle the refresh this caller started
///
/// Dropping it unsettled releases every waiter with
/// [`RefreshError::Abandoned`] and clears the in-progress flag.
pub(crate) struct RefreshLead<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLead<'_> {
    /// Publish the outcome to every queued request and clear the flag
    pub(crate) fn settle(mut self, outcome: &RefreshOutcome) {
        self.coordinator.settle(outcome);
        self.settled = true;
    }
}

impl Drop for RefreshLead<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(&Err(RefreshError::Abandoned));
        }
    }
}

pub(crate) struct RefreshWait {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl RefreshWait {
    pub(crate) async fn outcome(self) -> RefreshOutcome {
        self.rx.await.unwrap_or(Err(RefreshError::Abandoned))
    }
}
