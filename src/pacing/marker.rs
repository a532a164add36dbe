// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
CPU-waitable completion markers.

A marker is the CPU-side retirement gate for one frame slot: created in the
signaled state, reset when work is submitted, and signaled again by the backend
when that work retires.  The pacer blocks on it before reusing the slot.
*/

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Shared {
    signaled: Mutex<bool>,
    condvar: Condvar,
}

/**
A CPU-waitable completion marker.

Markers are level-triggered: once signaled they stay signaled until [`reset`](CompletionMarker::reset)
is called.  Clones share the same underlying state.
*/
#[derive(Debug, Clone)]
pub struct CompletionMarker {
    shared: Arc<Shared>,
}

/**
Outcome of a bounded wait on a [CompletionMarker].
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Signaled,
    TimedOut,
}

impl CompletionMarker {
    ///Creates a marker that is already signaled, so the first wait on it returns immediately.
    pub fn new_signaled() -> Self {
        CompletionMarker {
            shared: Arc::new(Shared {
                signaled: Mutex::new(true),
                condvar: Condvar::new(),
            }),
        }
    }

    pub fn is_signaled(&self) -> bool {
        *self.shared.signaled.lock().unwrap()
    }

    ///Puts the marker back into the pending state.
    pub fn reset(&self) {
        *self.shared.signaled.lock().unwrap() = false;
    }

    /**
    Returns a signaler for this marker.

    The signaler is handed to the submission backend, which fires it when the
    associated work retires.
    */
    pub fn signaler(&self) -> MarkerSignaler {
        MarkerSignaler {
            shared: self.shared.clone(),
        }
    }

    ///Blocks until the marker is signaled.
    pub fn wait(&self) {
        let mut signaled = self.shared.signaled.lock().unwrap();
        while !*signaled {
            signaled = self.shared.condvar.wait(signaled).unwrap();
        }
    }

    /**
    Blocks until the marker is signaled or the budget expires.

    A budget of `None` waits indefinitely, matching the semantics of the
    unbounded wait in the underlying presentation protocol.
    */
    pub fn wait_budget(&self, budget: Option<Duration>) -> WaitOutcome {
        let Some(budget) = budget else {
            self.wait();
            return WaitOutcome::Signaled;
        };
        let deadline = Instant::now() + budget;
        let mut signaled = self.shared.signaled.lock().unwrap();
        while !*signaled {
            let now = Instant::now();
            if now >= deadline {
                return WaitOutcome::TimedOut;
            }
            let (next, timeout) = self
                .shared
                .condvar
                .wait_timeout(signaled, deadline - now)
                .unwrap();
            signaled = next;
            if timeout.timed_out() && !*signaled {
                return WaitOutcome::TimedOut;
            }
        }
        WaitOutcome::Signaled
    }
}

/**
The signal-side handle for a [CompletionMarker].

Cheap to clone; safe to fire from another thread.
*/
#[derive(Debug, Clone)]
pub struct MarkerSignaler {
    shared: Arc<Shared>,
}

impl MarkerSignaler {
    pub fn signal(&self) {
        *self.shared.signaled.lock().unwrap() = true;
        self.shared.condvar.notify_all();
    }
}
