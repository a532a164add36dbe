// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//at the moment the only in-tree backend is the mock

use crate::pacing::marker::MarkerSignaler;
use crate::pacing::signal::SignalId;
use std::time::Duration;

/**
The pipeline stage at which submitted work waits for its signal.

A rendering submission waits for the image-acquired signal at
[`ColorAttachmentOutput`](PipelineStage::ColorAttachmentOutput), so that
earlier stages may run before the image is actually available.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineStage {
    TopOfPipe,
    ColorAttachmentOutput,
    BottomOfPipe,
}

/**
Synchronization description for one unit of submitted work.
*/
#[derive(Debug)]
pub struct Submission {
    ///Signal the work waits on before `wait_stage`.
    pub wait: SignalId,
    pub wait_stage: PipelineStage,
    ///Signal set when the work completes, gating presentation.
    pub signal: SignalId,
    ///Fired by the backend when the work retires, releasing the frame slot.
    pub retire: MarkerSignaler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AcquireError {
    #[error("swap chain is out of date and must be rebuilt")]
    OutOfDate,
    #[error("presentation surface was lost")]
    SurfaceLost,
    #[error("device lost")]
    DeviceLost,
    #[error("timed out waiting for a swap-chain image")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("device lost")]
    DeviceLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PresentError {
    #[error("swap chain is out of date and must be rebuilt")]
    OutOfDate,
    #[error("presentation surface was lost")]
    SurfaceLost,
    #[error("device lost")]
    DeviceLost,
}

/**
The collaborator that hands out swap-chain images and displays finished ones.

Implementations map [SignalId] values onto their own native signal objects.
An implementation should return image indices below [`image_count`](PresentationEngine::image_count);
the pacer tolerates larger indices by growing its image-in-use table.
*/
pub trait PresentationEngine {
    ///Number of swap-chain images.  Need not equal the pacer's slot count.
    fn image_count(&self) -> usize;
    /**
    Requests the next available image.

    `ready` must be signaled (GPU-side) when the returned image becomes
    available for rendering.  `timeout` of `None` waits indefinitely.
    */
    fn acquire_next_image(
        &mut self,
        timeout: Option<Duration>,
        ready: SignalId,
    ) -> Result<u32, AcquireError>;
    /**
    Queues `image` for display once `wait` is signaled.
    */
    fn present(&mut self, image: u32, wait: SignalId) -> Result<(), PresentError>;
}

/**
The collaborator that executes rendering work.

`submit` is fire-and-forget from the pacer's perspective; the backend reports
retirement asynchronously through [`Submission::retire`].
*/
pub trait SubmissionSurface {
    ///Backend-specific description of one frame's rendering work.
    type Work;
    fn submit(&mut self, work: Self::Work, submission: Submission) -> Result<(), SubmitError>;
}

#[cfg(feature = "backend_mock")]
pub mod mock;
