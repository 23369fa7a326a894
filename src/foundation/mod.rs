//! Shared primitives: error taxonomy, frame/canvas types and small integer math helpers.

pub mod core;
pub mod error;
pub(crate) mod math;
