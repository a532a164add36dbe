// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The frame pacer.

This implements the classic frames-in-flight protocol.  The main idea is,

1.  We have N frame slots, each owning an image-acquired signal, a
    render-finished signal, and a CPU-waitable completion marker.
2.  Before reusing a slot, the CPU blocks on its marker, bounding the number
    of outstanding frames to N.
3.  A swap-chain image handed back by the presentation engine may still be in
    flight under a *different* slot (the image count need not equal N), so a
    separate image-in-use table gates reuse of individual images.

All GPU-side ordering goes through the signal identities; the pacer itself is
driven by a single control thread and holds no locks of its own.
*/

use crate::imp::{
    AcquireError, PipelineStage, PresentError, PresentationEngine, SubmissionSurface, Submission,
    SubmitError,
};
use crate::pacing::marker::{CompletionMarker, WaitOutcome};
use crate::pacing::reporter::{pacer_reporter, PacerReporter, PacerReporterSend};
use crate::pacing::slot::{FrameSlot, SlotState};
use std::time::{Duration, Instant};

/**
A swap-chain image the pacer has acquired for the caller.

Move-only: consumed by [`FramePacer::submit`].
*/
#[derive(Debug)]
pub struct AcquiredImage {
    slot: usize,
    image: u32,
    began: Instant,
}

impl AcquiredImage {
    ///The swap-chain image index to render into.
    pub fn image_index(&self) -> u32 {
        self.image
    }
    ///The frame slot whose signals guard this frame.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/**
A frame whose work has been submitted.  Consumed by [`FramePacer::present`].
*/
#[derive(Debug)]
pub struct SubmittedFrame {
    slot: usize,
    image: u32,
}

impl SubmittedFrame {
    pub fn image_index(&self) -> u32 {
        self.image
    }
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CreateError {
    #[error("frame pacer needs at least one frame slot")]
    ZeroFrameSlots,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FrameError {
    #[error("can't acquire a swap-chain image: {0}")]
    Acquire(#[from] AcquireError),
    #[error("can't submit rendering work: {0}")]
    Submit(#[from] SubmitError),
    #[error("can't present image: {0}")]
    Present(#[from] PresentError),
    #[error("timed out waiting for frame slot {slot} to retire")]
    SlotWaitTimeout { slot: usize },
    #[error("timed out waiting for image {image} to leave flight")]
    ImageWaitTimeout { image: u32 },
}

/**
Coordinates CPU submission, GPU execution, and presentation so that at most N
frames are in flight and no swap-chain image is reused while still pending.

The pacer owns its signal and marker collections exclusively; drop it (or call
[`drain`](FramePacer::drain)) to retire everything deterministically.

# type parameters
`P` - the presentation engine.
`Q` - the submission surface.  One object frequently implements both; pass
clones of it.
*/
#[derive(Debug)]
pub struct FramePacer<P, Q>
where
    P: PresentationEngine,
    Q: SubmissionSurface,
{
    presentation: P,
    queue: Q,
    slots: Vec<FrameSlot>,
    //image index -> marker of the slot last submitted against it.
    images_in_flight: Vec<Option<CompletionMarker>>,
    current: usize,
    frame: u64,
    wait_budget: Option<Duration>,
    reporter_send: PacerReporterSend,
    reporter: PacerReporter,
}

impl<P, Q> FramePacer<P, Q>
where
    P: PresentationEngine,
    Q: SubmissionSurface,
{
    /**
    Creates a pacer with `frames_in_flight` slots.

    All signals and markers are created here; markers start signaled so the
    first pass over each slot does not block.
    */
    pub fn new(presentation: P, queue: Q, frames_in_flight: usize) -> Result<Self, CreateError> {
        if frames_in_flight == 0 {
            return Err(CreateError::ZeroFrameSlots);
        }
        let image_count = presentation.image_count();
        let slots = (0..frames_in_flight).map(|_| FrameSlot::new()).collect();
        let (reporter_send, reporter) = pacer_reporter(0);
        logwise::info_sync!(
            "FramePacer created with {slots} slots for {images} swap-chain images",
            slots = logwise::privacy::LogIt(&frames_in_flight),
            images = logwise::privacy::LogIt(&image_count)
        );
        Ok(FramePacer {
            presentation,
            queue,
            slots,
            images_in_flight: vec![None; image_count],
            current: 0,
            frame: 0,
            wait_budget: None,
            reporter_send,
            reporter,
        })
    }

    /**
    Sets a budget for the pacer's blocking waits.

    The default is `None`: unbounded waits, as the underlying protocol uses in
    practice.  With a budget set, an expired wait surfaces as
    [`FrameError::SlotWaitTimeout`] / [`FrameError::ImageWaitTimeout`] instead
    of blocking forever, and drop-time drain gives up after the budget per
    slot.
    */
    pub fn set_wait_budget(&mut self, budget: Option<Duration>) {
        self.wait_budget = budget;
    }

    /**
    Blocks until the current frame slot retires, then acquires the next
    swap-chain image into it.

    If the returned image is still in flight under a different slot, this also
    blocks until that submission retires, so the caller may write to the image
    unconditionally.
    */
    pub fn acquire(&mut self) -> Result<AcquiredImage, FrameError> {
        logwise::trace_sync!("FramePacer::acquire");
        let began = Instant::now();
        let current = self.current;
        self.slots[current].state = SlotState::Acquiring;

        //wait for the previous use of this slot's signals to fully retire
        let retired = self.slots[current].retired.clone();
        match retired.wait_budget(self.wait_budget) {
            WaitOutcome::Signaled => {}
            WaitOutcome::TimedOut => {
                self.slots[current].state = SlotState::Idle;
                return Err(FrameError::SlotWaitTimeout { slot: current });
            }
        }
        if let Some(guard) = self.slots[current].frame_guard.take() {
            guard.retire();
        }

        let ready = self.slots[current].image_ready;
        let image = match self.presentation.acquire_next_image(self.wait_budget, ready) {
            Ok(image) => image,
            Err(e) => {
                self.slots[current].state = SlotState::Idle;
                return Err(e.into());
            }
        };

        //the image may be guarded by a different slot's marker
        let index = image as usize;
        if index >= self.images_in_flight.len() {
            self.images_in_flight.resize(index + 1, None);
        }
        if let Some(marker) = &self.images_in_flight[index] {
            if !marker.is_signaled() {
                logwise::trace_sync!("FramePacer::acquire waiting for image in flight");
                match marker.wait_budget(self.wait_budget) {
                    WaitOutcome::Signaled => {}
                    WaitOutcome::TimedOut => {
                        self.slots[current].state = SlotState::Idle;
                        return Err(FrameError::ImageWaitTimeout { image });
                    }
                }
            }
        }

        self.frame += 1;
        self.reporter_send.begin_frame(self.frame);
        //the image is now the caller's; the slot rests until submit
        self.slots[current].state = SlotState::Idle;
        Ok(AcquiredImage {
            slot: current,
            image,
            began,
        })
    }

    /**
    Submits rendering work for an acquired image.

    The work waits on the slot's image-acquired signal at the color-output
    stage, signals the slot's render-finished signal on completion, and fires
    the slot's completion marker when it retires.  Bookkeeping (marker reset,
    image-in-use table) is updated synchronously; execution is the backend's
    business.
    */
    pub fn submit(
        &mut self,
        acquired: AcquiredImage,
        work: Q::Work,
    ) -> Result<SubmittedFrame, FrameError> {
        let AcquiredImage { slot, image, began } = acquired;
        let retired = self.slots[slot].retired.clone();
        let submission = Submission {
            wait: self.slots[slot].image_ready,
            wait_stage: PipelineStage::ColorAttachmentOutput,
            signal: self.slots[slot].render_finished,
            retire: retired.signaler(),
        };
        retired.reset();
        if let Err(e) = self.queue.submit(work, submission) {
            //un-wedge the slot so a later drain terminates
            retired.signaler().signal();
            self.slots[slot].state = SlotState::Idle;
            return Err(e.into());
        }
        self.slots[slot].frame_guard = Some(self.reporter_send.frame_guard(began));
        self.images_in_flight[image as usize] = Some(retired);
        self.slots[slot].state = SlotState::Submitted;
        Ok(SubmittedFrame { slot, image })
    }

    /**
    Queues the frame's image for display after its render-finished signal, and
    advances to the next frame slot.

    No wait happens here; backpressure comes from the blocking wait at the top
    of the next [`acquire`](FramePacer::acquire).
    */
    pub fn present(&mut self, frame: SubmittedFrame) -> Result<(), FrameError> {
        let SubmittedFrame { slot, image } = frame;
        self.slots[slot].state = SlotState::Presenting;
        let wait = self.slots[slot].render_finished;
        let result = self.presentation.present(image, wait);
        self.slots[slot].state = SlotState::Idle;
        result?;
        self.current = (self.current + 1) % self.slots.len();
        Ok(())
    }

    /**
    Waits for every slot's outstanding work to retire and clears the
    image-in-use table.

    Required before destroying backend signal objects; dropping the pacer does
    this automatically.  With a wait budget set, a slot that fails to retire
    within the budget is abandoned rather than blocking teardown forever.
    */
    pub fn drain(&mut self) {
        logwise::trace_sync!("FramePacer::drain");
        for (index, slot) in self.slots.iter_mut().enumerate() {
            match slot.retired.wait_budget(self.wait_budget) {
                WaitOutcome::Signaled => {
                    if let Some(guard) = slot.frame_guard.take() {
                        guard.retire();
                    }
                }
                WaitOutcome::TimedOut => {
                    logwise::info_sync!(
                        "FramePacer::drain abandoning slot {slot}",
                        slot = logwise::privacy::LogIt(&index)
                    );
                    if let Some(guard) = slot.frame_guard.take() {
                        //close the timing record anyway; the frame never retired
                        guard.retire();
                    }
                }
            }
            slot.state = SlotState::Idle;
        }
        for entry in &mut self.images_in_flight {
            *entry = None;
        }
    }

    ///Number of frame slots (N).
    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    ///The slot the next [`acquire`](FramePacer::acquire) will use.
    pub fn current_slot(&self) -> usize {
        self.current
    }

    pub fn slot_state(&self, slot: usize) -> SlotState {
        self.slots[slot].state
    }

    ///Number of slots whose submitted work has not yet retired.
    pub fn in_flight(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !slot.retired.is_signaled())
            .count()
    }

    pub fn reporter(&self) -> &PacerReporter {
        &self.reporter
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }
}

impl<P, Q> Drop for FramePacer<P, Q>
where
    P: PresentationEngine,
    Q: SubmissionSurface,
{
    fn drop(&mut self) {
        self.drain();
    }
}
