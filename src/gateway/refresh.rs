//! Single-flight coordination of credential refreshes.
//!
//! At most one refresh runs at a time. Requests that hit a 401 while a
//! refresh is running wait for its outcome instead of starting their own.
//! The flag and the wait queue change together under one lock, so the queue
//! is always drained before the flag is cleared, on any runtime flavour.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use super::ApiError;

type Outcome = Result<(), ApiError>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    /// Callers waiting on the in-flight refresh, in arrival order.
    waiters: Vec<oneshot::Sender<Outcome>>,
}

/// Process-wide refresh state owned by the gateway.
#[derive(Default, Clone)]
pub struct RefreshCoordinator {
    state: Arc<Mutex<RefreshState>>,
}

/// What a caller should do after asking to refresh.
pub enum RefreshTicket {
    /// No refresh was running; this caller must perform it and settle.
    Leader(RefreshLead),
    /// A refresh is already running; wait for its outcome.
    Follower(RefreshWait),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        lock_state(&self.state)
    }

    /// Start a refresh, or join the one already in flight.
    pub fn begin_or_join(&self) -> RefreshTicket {
        let mut state = self.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            let position = state.waiters.len();
            debug!(position, "Refresh in flight; queueing request");
            RefreshTicket::Follower(RefreshWait { rx, position })
        } else {
            state.in_flight = true;
            RefreshTicket::Leader(RefreshLead {
                state: Arc::clone(&self.state),
                settled: false,
            })
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().in_flight
    }

    /// Number of callers waiting on the in-flight refresh.
    pub fn queued(&self) -> usize {
        self.lock().waiters.len()
    }
}

fn lock_state(state: &Mutex<RefreshState>) -> MutexGuard<'_, RefreshState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Held by the one caller performing the refresh.
///
/// Dropping it without calling [`RefreshLead::settle`] (for instance when the
/// leading future is cancelled) releases every waiter with
/// [`ApiError::RefreshAbandoned`] and clears the flag.
pub struct RefreshLead {
    state: Arc<Mutex<RefreshState>>,
    settled: bool,
}

impl RefreshLead {
    /// Deliver `outcome` to every waiter in arrival order, then clear the
    /// in-flight flag. Returns how many waiters were released.
    pub fn settle(mut self, outcome: Outcome) -> usize {
        self.settled = true;
        drain(&self.state, outcome)
    }
}

impl Drop for RefreshLead {
    fn drop(&mut self) {
        if !self.settled {
            drain(&self.state, Err(ApiError::RefreshAbandoned));
        }
    }
}

fn drain(state: &Mutex<RefreshState>, outcome: Outcome) -> usize {
    let mut state = lock_state(state);
    let waiters = std::mem::take(&mut state.waiters);
    let released = waiters.len();
    for waiter in waiters {
        // A waiter whose caller went away has nothing to deliver to.
        let _ = waiter.send(outcome.clone());
    }
    state.in_flight = false;
    released
}

/// Held by a caller queued behind an in-flight refresh.
pub struct RefreshWait {
    rx: oneshot::Receiver<Outcome>,
    position: usize,
}

impl RefreshWait {
    /// 1-based place in the queue at the time of joining.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Wait for the in-flight refresh to settle.
    pub async fn wait(self) -> Outcome {
        self.rx.await.unwrap_or(Err(ApiError::RefreshAbandoned))
    }
}
