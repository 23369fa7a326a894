//! External encoder plumbing.

/// Encoder discovery and version probing.
pub mod locate;
/// Process supervision with timeout and cancellation.
pub mod runner;
/// Per-job temporary directories.
pub mod workdir;
