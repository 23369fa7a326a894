//! Export synthesis: request validation, strategy plans and the job runner.

pub mod job;
pub mod plan;
/// Progress events and the sinks that receive them.
pub mod progress;
pub mod request;
mod strategy;
