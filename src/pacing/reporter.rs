// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Frame statistics reporting for the pacer.

Timing follows the pacer's own phase boundaries: a frame *begins* when its
slot starts acquiring, is *submitted* when the backend accepts its work, and
*retires* when the slot's completion marker is next observed signaled.  The
CPU span is begin-to-submit; the GPU span is submit-to-retire.
*/

use await_values::{Observer, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

//window of retired frames the statistics are computed over
const STATS_WINDOW: usize = 60;

/**
Identifies one begun frame.

Frame indices increase monotonically over the life of a pacer, starting at 1
for the first acquired frame.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frame(u64);

impl Frame {
    pub(crate) fn new(index: u64) -> Self {
        Frame(index)
    }
    pub fn index(&self) -> u64 {
        self.0
    }
}

/**
A snapshot of the reporter's current statistics.

All values are computed over a sliding window of recently retired frames and
start at zero before the first frame retires.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    ///Frames per second, from the spacing of frame begins.
    pub fps: i32,
    ///Average submit-to-retire span, in milliseconds.
    pub gpu_ms: i32,
    ///Average begin-to-submit span, in milliseconds.
    pub cpu_ms: i32,
    ///Smallest gap between consecutive frame begins, in milliseconds.
    pub min_elapsed_ms: i32,
}

/**
Open timing record for one submitted frame.

Held by the frame's slot from submit until the slot's marker is observed
retired, at which point [`retire`](FrameGuard::retire) closes the record.
*/
#[derive(Debug)]
pub(crate) struct FrameGuard {
    began: Instant,
    submitted: Instant,
    imp: Arc<PacerReporterImpl>,
}

impl FrameGuard {
    ///Closes the record with a retirement timestamp of now.
    pub(crate) fn retire(self) {
        self.imp.record(FrameInfo {
            began: self.began,
            submitted: self.submitted,
            retired: Instant::now(),
        });
    }
}

///One retired frame's phase boundaries.
#[derive(Debug, Clone, Copy)]
struct FrameInfo {
    began: Instant,
    submitted: Instant,
    retired: Instant,
}

impl FrameInfo {
    fn cpu_ms(&self) -> i64 {
        self.submitted.duration_since(self.began).as_millis() as i64
    }
    fn gpu_ms(&self) -> i64 {
        self.retired.duration_since(self.submitted).as_millis() as i64
    }
}

/**
A type that clients can use to find out about pacer activity and perform their
own frame pacing on top of it.
 */
#[derive(Clone, Debug)]
pub struct PacerReporter {
    imp: Arc<PacerReporterImpl>,
    fps: Observer<i32>,
    ms: Observer<i32>,
    cpu_ms: Observer<i32>,
    min_elapsed_ms: Observer<i32>,
}
impl PacerReporter {
    /**
    Returns the frame most recently begun.

    Figuring out "which" frame you are "on" is kind of a nonsense question:
    several frames are in flight at any one time, so the answer is often
    something like "several".  This function reflects the most recent frame the
    pacer began acquiring.  The value can change at any time, including
    immediately after you called it, and provides no transactional isolation;
    it is a basic way to throw out data that is stale.
     */
    pub fn latest_begun(&self) -> Frame {
        Frame::new(self.imp.frame_begun.load(Ordering::Relaxed))
    }

    ///Returns the current statistics synchronously.
    pub fn stats(&self) -> FrameStats {
        *self.imp.latest.lock().unwrap()
    }

    pub fn fps(&self) -> &Observer<i32> {
        &self.fps
    }
    pub fn ms(&self) -> &Observer<i32> {
        &self.ms
    }
    pub fn cpu_ms(&self) -> &Observer<i32> {
        &self.cpu_ms
    }

    /**
    Returns the minimum elapsed time between frames from recent samples, in milliseconds.

    This can be used by clients to predict their processing times for frame pacing.
    */
    pub fn min_elapsed_ms(&self) -> &Observer<i32> {
        &self.min_elapsed_ms
    }
}

#[derive(Debug)]
pub(crate) struct PacerReporterImpl {
    frame_begun: AtomicU64,
    fps: Value<i32>,
    ms: Value<i32>,
    cpu_ms: Value<i32>,
    min_elapsed_ms: Value<i32>,
    history: Mutex<VecDeque<FrameInfo>>,
    latest: Mutex<FrameStats>,
}
impl PacerReporterImpl {
    fn record(&self, info: FrameInfo) {
        let mut history = self.history.lock().unwrap();
        if history.len() == STATS_WINDOW {
            history.pop_front();
        }
        history.push_back(info);

        //one pass: phase totals plus the spacing of frame begins
        let mut total_cpu_ms = 0i64;
        let mut total_gpu_ms = 0i64;
        let mut gap_sum = 0.0f64;
        let mut gap_min = f64::INFINITY;
        let mut previous_began: Option<Instant> = None;
        for frame in history.iter() {
            total_cpu_ms += frame.cpu_ms();
            total_gpu_ms += frame.gpu_ms();
            if let Some(previous) = previous_began {
                let gap = frame.began.duration_since(previous).as_secs_f64();
                gap_sum += gap;
                gap_min = gap_min.min(gap);
            }
            previous_began = Some(frame.began);
        }

        let frames = history.len() as i64;
        let mut stats = *self.latest.lock().unwrap();
        stats.cpu_ms = (total_cpu_ms / frames) as i32;
        stats.gpu_ms = (total_gpu_ms / frames) as i32;
        //rate and spacing need at least two begins
        if frames > 1 && gap_sum > 0.0 {
            stats.fps = ((frames - 1) as f64 / gap_sum).round() as i32;
            stats.min_elapsed_ms = (gap_min * 1000.0) as i32;
        }

        self.fps.set(stats.fps);
        self.ms.set(stats.gpu_ms);
        self.cpu_ms.set(stats.cpu_ms);
        self.min_elapsed_ms.set(stats.min_elapsed_ms);
        *self.latest.lock().unwrap() = stats;
    }
}

#[derive(Debug)]
pub(crate) struct PacerReporterSend {
    imp: Arc<PacerReporterImpl>,
}
impl PacerReporterSend {
    pub(crate) fn begin_frame(&mut self, frame: u64) {
        self.imp.frame_begun.store(frame, Ordering::Relaxed);
    }

    ///Opens a timing record for a frame the backend just accepted.
    pub(crate) fn frame_guard(&self, began: Instant) -> FrameGuard {
        FrameGuard {
            began,
            submitted: Instant::now(),
            imp: self.imp.clone(),
        }
    }
}

pub(crate) fn pacer_reporter(initial_frame: u64) -> (PacerReporterSend, PacerReporter) {
    let fps = Value::new(0);
    let ms = Value::new(0);
    let cpu_ms = Value::new(0);
    let min_elapsed_ms = Value::new(0);

    let fps_observer = fps.observe();
    let ms_observer = ms.observe();
    let cpu_ms_observer = cpu_ms.observe();
    let min_elapsed_ms_observer = min_elapsed_ms.observe();

    let imp = Arc::new(PacerReporterImpl {
        frame_begun: AtomicU64::new(initial_frame),
        fps,
        ms,
        cpu_ms,
        min_elapsed_ms,
        history: Mutex::new(VecDeque::with_capacity(STATS_WINDOW)),
        latest: Mutex::new(FrameStats::default()),
    });

    (
        PacerReporterSend { imp: imp.clone() },
        PacerReporter {
            imp,
            fps: fps_observer,
            ms: ms_observer,
            cpu_ms: cpu_ms_observer,
            min_elapsed_ms: min_elapsed_ms_observer,
        },
    )
}
