#![cfg(feature = "backend_mock")]

use frames_and_fences::imp::mock::{MockCall, MockGpu, ScriptedEvents};
use frames_and_fences::imp::AcquireError;
use frames_and_fences::pacing::pacer::FrameError;
use frames_and_fences::pacing::{FramePacer, RenderLoop};

/// Drives the canonical scenario: 3 frame slots over 5 swap-chain images for
/// 10 loop iterations with an instantaneous mock GPU.
///
/// Asserts the acquired image sequence never reuses an index without the prior
/// submission having retired, and that exactly 10 presents occur, each paired
/// with exactly one matching submit.
#[test]
fn three_slots_five_images_ten_frames() {
    let gpu = MockGpu::new(5);
    let pacer = FramePacer::new(gpu.clone(), gpu.clone(), 3).expect("create pacer");
    let mut render_loop = RenderLoop::new(pacer, ScriptedEvents::close_after(10));

    let presented = render_loop.run(|_acquired| "frame").expect("run loop");
    assert_eq!(presented, 10);

    let calls = gpu.calls();
    let acquired: Vec<u32> = calls
        .iter()
        .filter_map(|c| match c {
            MockCall::Acquire { image, .. } => Some(*image),
            _ => None,
        })
        .collect();
    // round-robin over 5 images for 10 frames
    assert_eq!(acquired, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
    // no two consecutive acquisitions of the same image
    for pair in acquired.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }

    let submits = calls
        .iter()
        .filter(|c| matches!(c, MockCall::Submit { .. }))
        .count();
    let presents = calls
        .iter()
        .filter(|c| matches!(c, MockCall::Present { .. }))
        .count();
    assert_eq!(submits, 10);
    assert_eq!(presents, 10);

    // each present is immediately preceded by its own submit: the present
    // waits on exactly the signal that submit raises
    for (index, call) in calls.iter().enumerate() {
        if let MockCall::Present { wait, .. } = call {
            match &calls[index - 1] {
                MockCall::Submit { signal, .. } => assert_eq!(signal, wait),
                other => panic!("present not preceded by a submit: {:?}", other),
            }
        }
    }
}

/// The loop shape is acquire, submit, present, strictly in that order per
/// frame; the mock call log interleaves them with no overlap.
#[test]
fn call_order_per_frame() {
    let gpu = MockGpu::new(2);
    let pacer = FramePacer::new(gpu.clone(), gpu.clone(), 2).expect("create pacer");
    let mut render_loop = RenderLoop::new(pacer, ScriptedEvents::close_after(4));
    render_loop.run(|_| "frame").expect("run loop");

    let calls = gpu.calls();
    assert_eq!(calls.len(), 12);
    for frame in calls.chunks(3) {
        assert!(matches!(frame[0], MockCall::Acquire { .. }));
        assert!(matches!(frame[1], MockCall::Submit { .. }));
        assert!(matches!(frame[2], MockCall::Present { .. }));
    }
}

/// The reporter tracks the most recently begun frame.
#[test]
fn reporter_latest_begun() {
    let gpu = MockGpu::new(3);
    let pacer = FramePacer::new(gpu.clone(), gpu.clone(), 2).expect("create pacer");
    let reporter = pacer.reporter().clone();
    assert_eq!(reporter.latest_begun().index(), 0);

    let mut render_loop = RenderLoop::new(pacer, ScriptedEvents::close_after(7));
    render_loop.run(|_| "frame").expect("run loop");
    assert_eq!(reporter.latest_begun().index(), 7);
}

/// Running frames with a measurable encode cost moves the reporter's
/// statistics off their initial zeros: fps reflects the frame spacing, the
/// CPU average covers begin-to-submit, and the minimum elapsed gap is at
/// least the per-frame cost.
#[test]
fn reporter_statistics_reflect_frames() {
    const ENCODE: std::time::Duration = std::time::Duration::from_millis(5);

    let gpu = MockGpu::new(3);
    let pacer = FramePacer::new(gpu.clone(), gpu.clone(), 2).expect("create pacer");
    let reporter = pacer.reporter().clone();
    assert_eq!(reporter.stats(), Default::default());

    let mut render_loop = RenderLoop::new(pacer, ScriptedEvents::close_after(6));
    // run drains on close, so every frame's timing record is closed here
    render_loop
        .run(|_| {
            std::thread::sleep(ENCODE);
            "frame"
        })
        .expect("run loop");

    let stats = reporter.stats();
    // every frame costs at least ENCODE on the CPU, so the spacing of begins
    // bounds the rate from above
    assert!(stats.fps >= 1 && stats.fps <= 200, "fps {}", stats.fps);
    assert!(stats.cpu_ms >= 5, "cpu_ms {}", stats.cpu_ms);
    assert!(stats.min_elapsed_ms >= 5, "min_elapsed_ms {}", stats.min_elapsed_ms);
    // early frames retire only at the next reuse of their slot, a window
    // spanning at least one later frame's encode
    assert!(stats.gpu_ms > 0, "gpu_ms {}", stats.gpu_ms);
}

/// Acquire failures surface as distinct variants; the loop treats them as
/// fatal and stops.
#[test]
fn acquire_failure_is_fatal_and_matchable() {
    let gpu = MockGpu::new(3);
    let pacer = FramePacer::new(gpu.clone(), gpu.clone(), 2).expect("create pacer");
    gpu.fail_next_acquire(AcquireError::OutOfDate);

    let mut render_loop = RenderLoop::new(pacer, ScriptedEvents::close_after(10));
    let error = render_loop.run(|_| "frame").expect_err("loop must stop");
    match error {
        FrameError::Acquire(AcquireError::OutOfDate) => {}
        other => panic!("expected out-of-date, got {:?}", other),
    }
    // nothing was submitted or presented for the failed frame
    assert!(gpu.calls().is_empty());
}
