//! Duration reconciliation and play-head location.

pub mod quantize;
pub mod schedule;
