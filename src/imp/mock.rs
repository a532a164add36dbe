// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
A mock presentation engine and submission surface.

This backend fills the collaborator seam without any GPU: images are handed
out round-robin, submissions retire either instantly or under test control,
and every call is recorded so tests can assert on ordering.
*/

use super::{
    AcquireError, PipelineStage, PresentError, PresentationEngine, SubmissionSurface, Submission,
    SubmitError,
};
use crate::pacing::marker::MarkerSignaler;
use crate::pacing::run_loop::EventSource;
use crate::pacing::signal::SignalId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/**
When mock submissions retire.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    ///Work retires inside `submit`, as if the GPU were instantaneous.
    #[default]
    Immediate,
    ///Work queues until [MockGpu::complete_next] fires it.
    Manual,
}

/**
One recorded backend call.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Acquire {
        image: u32,
        ready: SignalId,
    },
    Submit {
        label: &'static str,
        wait: SignalId,
        wait_stage: PipelineStage,
        signal: SignalId,
    },
    Present {
        image: u32,
        wait: SignalId,
    },
}

#[derive(Debug)]
struct Shared {
    image_count: usize,
    next_image: usize,
    completion: CompletionMode,
    pending: VecDeque<MarkerSignaler>,
    calls: Vec<MockCall>,
    fail_acquire: Option<AcquireError>,
    fail_submit: Option<SubmitError>,
    fail_present: Option<PresentError>,
}

/**
The mock GPU.

Clones share state, so one clone can serve as the presentation engine, another
as the submission surface, and a third can stay with the test for inspection.
*/
#[derive(Debug, Clone)]
pub struct MockGpu {
    shared: Arc<Mutex<Shared>>,
}

impl MockGpu {
    /**
    # Panics
    Panics if `image_count` is zero; a swap chain always has at least one image.
    */
    pub fn new(image_count: usize) -> Self {
        Self::with_completion(image_count, CompletionMode::Immediate)
    }

    /**
    # Panics
    Panics if `image_count` is zero; a swap chain always has at least one image.
    */
    pub fn with_completion(image_count: usize, completion: CompletionMode) -> Self {
        assert!(image_count > 0, "mock swap chain needs at least one image");
        MockGpu {
            shared: Arc::new(Mutex::new(Shared {
                image_count,
                next_image: 0,
                completion,
                pending: VecDeque::new(),
                calls: Vec::new(),
                fail_acquire: None,
                fail_submit: None,
                fail_present: None,
            })),
        }
    }

    /**
    Retires the oldest pending submission.

    Returns false if nothing was pending.  Only meaningful in
    [CompletionMode::Manual].
    */
    pub fn complete_next(&self) -> bool {
        let signaler = self.shared.lock().unwrap().pending.pop_front();
        match signaler {
            Some(signaler) => {
                signaler.signal();
                true
            }
            None => false,
        }
    }

    ///Number of submissions that have not retired yet.
    pub fn pending(&self) -> usize {
        self.shared.lock().unwrap().pending.len()
    }

    ///The full call history, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.shared.lock().unwrap().calls.clone()
    }

    ///Makes the next acquire fail with `error`.
    pub fn fail_next_acquire(&self, error: AcquireError) {
        self.shared.lock().unwrap().fail_acquire = Some(error);
    }

    ///Makes the next submit fail with `error`.
    pub fn fail_next_submit(&self, error: SubmitError) {
        self.shared.lock().unwrap().fail_submit = Some(error);
    }

    ///Makes the next present fail with `error`.
    pub fn fail_next_present(&self, error: PresentError) {
        self.shared.lock().unwrap().fail_present = Some(error);
    }
}

impl PresentationEngine for MockGpu {
    fn image_count(&self) -> usize {
        self.shared.lock().unwrap().image_count
    }

    fn acquire_next_image(
        &mut self,
        _timeout: Option<Duration>,
        ready: SignalId,
    ) -> Result<u32, AcquireError> {
        let mut shared = self.shared.lock().unwrap();
        if let Some(error) = shared.fail_acquire.take() {
            return Err(error);
        }
        let image = shared.next_image as u32;
        shared.next_image = (shared.next_image + 1) % shared.image_count;
        shared.calls.push(MockCall::Acquire { image, ready });
        Ok(image)
    }

    fn present(&mut self, image: u32, wait: SignalId) -> Result<(), PresentError> {
        let mut shared = self.shared.lock().unwrap();
        if let Some(error) = shared.fail_present.take() {
            return Err(error);
        }
        shared.calls.push(MockCall::Present { image, wait });
        Ok(())
    }
}

impl SubmissionSurface for MockGpu {
    type Work = &'static str;

    fn submit(&mut self, work: Self::Work, submission: Submission) -> Result<(), SubmitError> {
        let mut shared = self.shared.lock().unwrap();
        if let Some(error) = shared.fail_submit.take() {
            return Err(error);
        }
        shared.calls.push(MockCall::Submit {
            label: work,
            wait: submission.wait,
            wait_stage: submission.wait_stage,
            signal: submission.signal,
        });
        match shared.completion {
            CompletionMode::Immediate => submission.retire.signal(),
            CompletionMode::Manual => shared.pending.push_back(submission.retire),
        }
        Ok(())
    }
}

/**
An [EventSource] that requests close after a fixed number of event pumps,
standing in for a real window.
*/
#[derive(Debug)]
pub struct ScriptedEvents {
    close_after: usize,
    pumps: usize,
}

impl ScriptedEvents {
    ///Closes once `frames` loop iterations have run.
    pub fn close_after(frames: usize) -> Self {
        ScriptedEvents {
            close_after: frames,
            pumps: 0,
        }
    }
}

impl EventSource for ScriptedEvents {
    fn pump_events(&mut self) {
        self.pumps += 1;
    }
    fn close_requested(&self) -> bool {
        self.pumps > self.close_after
    }
}
