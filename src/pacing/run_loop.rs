// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The presentation loop driver.

use crate::imp::{PresentationEngine, SubmissionSurface};
use crate::pacing::pacer::{AcquiredImage, FrameError, FramePacer};

/**
The windowing collaborator: pumps platform events and reports close requests.

Treated as a black box invoked once per loop iteration before any pacing
logic.
*/
pub trait EventSource {
    fn pump_events(&mut self);
    fn close_requested(&self) -> bool;
}

/**
Drives a [FramePacer] until the event source requests close.

Each iteration pumps events, acquires an image, asks the caller to encode work
for it, submits, and presents.  Any frame error is fatal: the loop stops and
returns it.  On a clean close the pacer is drained before returning, so
backend objects can be destroyed immediately afterwards.
*/
#[derive(Debug)]
pub struct RenderLoop<P, Q, E>
where
    P: PresentationEngine,
    Q: SubmissionSurface,
    E: EventSource,
{
    pacer: FramePacer<P, Q>,
    events: E,
}

impl<P, Q, E> RenderLoop<P, Q, E>
where
    P: PresentationEngine,
    Q: SubmissionSurface,
    E: EventSource,
{
    pub fn new(pacer: FramePacer<P, Q>, events: E) -> Self {
        RenderLoop { pacer, events }
    }

    /**
    Runs until close is requested, returning the number of frames presented.

    `encode` is called once per frame with the acquired image and produces the
    backend work for that frame.
    */
    pub fn run<F>(&mut self, mut encode: F) -> Result<u64, FrameError>
    where
        F: FnMut(&AcquiredImage) -> Q::Work,
    {
        let mut presented = 0;
        loop {
            self.events.pump_events();
            if self.events.close_requested() {
                break;
            }
            let acquired = self.pacer.acquire()?;
            let work = encode(&acquired);
            let submitted = self.pacer.submit(acquired, work)?;
            self.pacer.present(submitted)?;
            presented += 1;
        }
        logwise::info_sync!(
            "RenderLoop close requested after {frames} frames",
            frames = logwise::privacy::LogIt(&presented)
        );
        self.pacer.drain();
        Ok(presented)
    }

    pub fn pacer(&self) -> &FramePacer<P, Q> {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut FramePacer<P, Q> {
        &mut self.pacer
    }

    pub fn into_pacer(self) -> FramePacer<P, Q> {
        self.pacer
    }
}
