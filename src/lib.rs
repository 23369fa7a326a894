//! stillreel turns an ordered list of still images, each with a display duration and an optional
//! transition into the next, into a live preview and an exported video with identical timing.
//!
//! - Build or load a [`Timeline`] (see [`timeline::ingest`] and [`timeline::archive`])
//! - Preview it with a [`PreviewCompositor`] driven by a [`Player`]
//! - Export it with an [`Exporter`], which drives an external `ffmpeg`
//!
//! Both paths read the same frame-quantized schedule ([`QuantizedTimeline`]), so a frame in the
//! exported file shows the clip the preview shows at that time.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod assets;
pub mod config;
pub mod effects;
pub mod encode;
pub mod export;
mod foundation;
pub mod preview;
pub mod timeline;
pub mod timing;

#[cfg(test)]
mod test_support;

pub use crate::config::EngineConfig;
pub use crate::effects::transitions::{TransitionKind, TransitionSpec};
pub use crate::encode::runner::CancelToken;
pub use crate::export::job::{
    Capabilities, ExportArtifact, ExportFailure, Exporter, capabilities,
};
pub use crate::export::progress::{
    ExportProgress, ExportStage, NoProgress, ProgressLog, ProgressSink,
};
pub use crate::export::request::{
    ExportRequest, OutputFormat, Quality, RateControl, Strategy, StrategySelector,
};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRGBA};
pub use crate::foundation::error::{ErrorKind, ReelError, ReelResult};
pub use crate::foundation::math::clamp01;
pub use crate::preview::cache::ImageCache;
pub use crate::preview::compositor::PreviewCompositor;
pub use crate::preview::player::{Player, Transport};
pub use crate::timeline::model::{Clip, Timeline};
pub use crate::timeline::project::{ImageLibrary, Project};
pub use crate::timing::quantize::{QuantizeMode, quantize};
pub use crate::timing::schedule::{PlayheadState, QuantizedTimeline};
