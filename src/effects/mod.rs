//! Transition table and the CPU blend kernels used by the preview compositor.

pub mod kernels;
/// Transition kinds and their per-boundary settings.
pub mod transitions;
