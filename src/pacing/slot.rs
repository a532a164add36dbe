// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Per-slot state for the frame pacer.

use super::marker::CompletionMarker;
use super::reporter::FrameGuard;
use super::signal::SignalId;

/**
The CPU-side phase of one frame slot.

`Acquiring` covers the blocking wait on the slot's marker through the image
request; the slot rests at `Idle` while the caller holds the acquired image.
`Submitted` means work for this slot has been handed to the backend;
`Presenting` covers the present request, after which the slot is `Idle` again —
GPU-side in-flight-ness is tracked by the completion marker, not by this enum.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Acquiring,
    Submitted,
    Presenting,
}

#[derive(Debug)]
pub(crate) struct FrameSlot {
    pub image_ready: SignalId,
    pub render_finished: SignalId,
    pub retired: CompletionMarker,
    pub state: SlotState,
    //timing guard for the most recent submission through this slot, closed
    //when the marker is next observed retired
    pub frame_guard: Option<FrameGuard>,
}

impl FrameSlot {
    pub fn new() -> Self {
        FrameSlot {
            image_ready: SignalId::mint(),
            render_finished: SignalId::mint(),
            retired: CompletionMarker::new_signaled(),
            state: SlotState::Idle,
            frame_guard: None,
        }
    }
}
