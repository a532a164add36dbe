// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Opaque GPU-side signal identities.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SIGNAL: AtomicU64 = AtomicU64::new(0);

/**
An opaque identity for a GPU-side signal (a binary semaphore, in Vulkan terms).

The pacer mints one image-acquired and one render-finished signal per frame
slot and threads them through acquire/submit/present calls.  Backends map each
identity to whatever native object they use; the pacer itself never inspects
them beyond equality.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(u64);

impl SignalId {
    pub(crate) fn mint() -> Self {
        SignalId(NEXT_SIGNAL.fetch_add(1, Ordering::Relaxed))
    }
}
