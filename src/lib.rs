/*! frames_and_fences is frame-pacing middleware: the fence/semaphore/acquire/submit/present
cycle of a modern presentation loop, factored out of the surrounding GPU plumbing.

Every explicit-synchronization graphics API ships the same small protocol: N
frame slots rotate; each owns an image-acquired signal, a render-finished
signal, and a CPU-waitable completion marker; the CPU blocks on the marker
before reusing a slot, and a separate table keeps a swap-chain image from
being rewritten while a *different* slot still has it in flight.  Tutorials
write this inline between a thousand lines of device bring-up.  Engines bury
it inside a renderer.  This crate is just the protocol.

Here is a quick chart of where that leaves us:

| Strategy            | Examples                     | What you get                                   | Sync bugs possible |
|---------------------|------------------------------|------------------------------------------------|--------------------|
| Inline tutorial code| vulkan-tutorial and friends  | The full call sequence, duplicated per variant | All of them        |
| Game engine         | Unity, Unreal, Godot         | A frame when the engine feels like it          | Few, not yours to fix |
| This crate          | frames_and_fences            | The pacing protocol as a tested unit           | The ones in your backend |

# Architecture

[`pacing::FramePacer`] owns the signal and marker collections with no external
aliasing and exposes `acquire` / `submit` / `present` / `drain`.  It talks to
its collaborators through the traits in [`imp`]: a presentation engine that
hands out and displays swap-chain images, and a submission surface that
executes work.  Bring-up of a real device, swap chain, and pipelines is
deliberately not here; it is one-shot glue that belongs next to whichever
graphics API you drive.

A mock backend (feature `backend_mock`, on by default) fills the seam for
tests and for development without a GPU.

# Failure semantics

During the loop, acquire/submit/present failures are surfaced as distinct
error variants (out-of-date, surface lost, device lost) rather than recovered:
the bundled [`pacing::RenderLoop`] treats them all as fatal, which matches the
protocol this crate is distilled from.  A caller that owns a swap chain can
match on the out-of-date variant and rebuild.
*/

pub mod imp;
pub mod pacing;

pub use pacing::FramePacer;
