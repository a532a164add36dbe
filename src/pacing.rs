// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! The pacing component of frames_and_fences */

pub use pacer::{AcquiredImage, FramePacer, SubmittedFrame};
pub use reporter::{Frame, FrameStats, PacerReporter};
pub use run_loop::{EventSource, RenderLoop};
pub use signal::SignalId;
pub use slot::SlotState;

pub mod marker;
pub mod pacer;
pub mod reporter;
pub mod run_loop;

pub(crate) mod signal;
pub(crate) mod slot;
