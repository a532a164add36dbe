#![cfg(feature = "backend_mock")]

use frames_and_fences::imp::mock::{CompletionMode, MockGpu};
use frames_and_fences::pacing::{FramePacer, SlotState};
use std::time::Duration;

/// A slot that goes acquire → submit → present returns to a state
/// indistinguishable from its starting state, modulo the rotated index.
#[test]
fn slot_round_trip() {
    let gpu = MockGpu::new(3);
    let mut pacer = FramePacer::new(gpu.clone(), gpu.clone(), 2).expect("create pacer");
    assert_eq!(pacer.current_slot(), 0);
    assert_eq!(pacer.slot_state(0), SlotState::Idle);

    let acquired = pacer.acquire().expect("acquire");
    assert_eq!(acquired.slot(), 0);
    let submitted = pacer.submit(acquired, "frame").expect("submit");
    assert_eq!(pacer.slot_state(0), SlotState::Submitted);
    pacer.present(submitted).expect("present");

    // immediate completion: the slot is back to rest, the index has rotated
    assert_eq!(pacer.slot_state(0), SlotState::Idle);
    assert_eq!(pacer.in_flight(), 0);
    assert_eq!(pacer.current_slot(), 1);
}

/// Draining waits out all in-flight work; afterwards every slot is idle and a
/// further drain is a no-op.
#[test]
fn drain_is_idempotent() {
    let gpu = MockGpu::with_completion(5, CompletionMode::Manual);
    let mut pacer = FramePacer::new(gpu.clone(), gpu.clone(), 3).expect("create pacer");

    for _ in 0..2 {
        let acquired = pacer.acquire().expect("acquire");
        let submitted = pacer.submit(acquired, "frame").expect("submit");
        pacer.present(submitted).expect("present");
    }
    assert_eq!(pacer.in_flight(), 2);

    // retire everything, then drain
    while gpu.complete_next() {}
    pacer.drain();
    assert_eq!(pacer.in_flight(), 0);
    for slot in 0..pacer.frames_in_flight() {
        assert_eq!(pacer.slot_state(slot), SlotState::Idle);
    }

    pacer.drain();
    assert_eq!(pacer.in_flight(), 0);
}

/// Drain, destroy, and re-create with the same N reproduces the initial idle
/// state.
#[test]
fn recreate_reproduces_initial_state() {
    let gpu = MockGpu::new(4);
    let mut pacer = FramePacer::new(gpu.clone(), gpu.clone(), 3).expect("create pacer");
    for _ in 0..4 {
        let acquired = pacer.acquire().expect("acquire");
        let submitted = pacer.submit(acquired, "frame").expect("submit");
        pacer.present(submitted).expect("present");
    }
    pacer.drain();
    drop(pacer);

    let gpu = MockGpu::new(4);
    let pacer = FramePacer::new(gpu.clone(), gpu.clone(), 3).expect("recreate pacer");
    assert_eq!(pacer.current_slot(), 0);
    assert_eq!(pacer.in_flight(), 0);
    assert_eq!(pacer.reporter().latest_begun().index(), 0);
    for slot in 0..pacer.frames_in_flight() {
        assert_eq!(pacer.slot_state(slot), SlotState::Idle);
    }
}

/// Dropping a pacer with unretired work and a wait budget abandons the wait
/// instead of hanging teardown.
#[test]
fn bounded_drop_with_stuck_gpu() {
    let gpu = MockGpu::with_completion(3, CompletionMode::Manual);
    let mut pacer = FramePacer::new(gpu.clone(), gpu.clone(), 2).expect("create pacer");
    pacer.set_wait_budget(Some(Duration::from_millis(10)));

    let acquired = pacer.acquire().expect("acquire");
    let submitted = pacer.submit(acquired, "frame").expect("submit");
    pacer.present(submitted).expect("present");
    assert_eq!(pacer.in_flight(), 1);

    // the GPU never retires this work; drop must still return
    drop(pacer);
}

/// An acquired image the caller walks away from leaves its slot resting at
/// idle, and the slot is reusable by the next acquire.
#[test]
fn abandoned_acquire_leaves_slot_idle() {
    let gpu = MockGpu::new(3);
    let mut pacer = FramePacer::new(gpu.clone(), gpu.clone(), 2).expect("create pacer");

    let acquired = pacer.acquire().expect("acquire");
    assert_eq!(acquired.slot(), 0);
    drop(acquired);
    assert_eq!(pacer.slot_state(0), SlotState::Idle);

    // the slot was never submitted, so reusing it does not block
    let acquired = pacer.acquire().expect("acquire again");
    assert_eq!(acquired.slot(), 0);
    let submitted = pacer.submit(acquired, "frame").expect("submit");
    pacer.present(submitted).expect("present");
}

/// Zero frame slots is rejected at construction.
#[test]
fn zero_slots_rejected() {
    let gpu = MockGpu::new(3);
    assert!(FramePacer::new(gpu.clone(), gpu.clone(), 0).is_err());
}
