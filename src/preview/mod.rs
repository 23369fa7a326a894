//! Interactive preview: a host-driven compositor over a prefetched image cache.
//!
//! Nothing here blocks on decode I/O once [`cache::ImageCache::prepare`] has returned.

/// Decoded images keyed by content.
pub mod cache;
pub mod compositor;
/// Transport state and wall-clock driven frame ticks.
pub mod player;
