//! Export request: what the caller asks for, and its validation.

use std::str::FromStr;

use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::{ReelError, ReelResult},
    timeline::ingest::image_extension,
    timeline::model::MAX_CLIP_DURATION_MS,
    timeline::project::Project,
    timing::schedule::QuantizedTimeline,
};

/// Output container/codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// H.264 in MP4, yuv420p.
    Mp4,
    /// VP9 in WebM.
    Webm,
    /// Palette GIF, loops forever.
    Gif,
}

impl OutputFormat {
    /// All supported formats.
    pub const ALL: [OutputFormat; 3] = [Self::Mp4, Self::Webm, Self::Gif];

    /// MIME type of the produced bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
            Self::Gif => "image/gif",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Gif => "gif",
        }
    }

    /// Chroma-subsampled outputs need even frame edges.
    pub fn needs_even_size(self) -> bool {
        !matches!(self, Self::Gif)
    }
}

impl FromStr for OutputFormat {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" | "h264" => Ok(Self::Mp4),
            "webm" | "vp9" => Ok(Self::Webm),
            "gif" => Ok(Self::Gif),
            other => Err(ReelError::validation(format!(
                "unsupported output format '{other}'"
            ))),
        }
    }
}

/// Strategy requested by the caller.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategySelector {
    /// Concatenation without transitions, segmented pipeline otherwise.
    #[default]
    Auto,
    /// Force the concatenation strategy.
    Concat,
    /// Force the single-pass cross-fade chain.
    Xfade,
    /// Force the segment-local pipeline.
    Segmented,
}

impl StrategySelector {
    /// All selector values.
    pub const ALL: [StrategySelector; 4] = [Self::Auto, Self::Concat, Self::Xfade, Self::Segmented];
}

impl FromStr for StrategySelector {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "concat" | "a" => Ok(Self::Concat),
            "xfade" | "b" => Ok(Self::Xfade),
            "segmented" | "c" => Ok(Self::Segmented),
            other => Err(ReelError::validation(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Strategy actually run for a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One encode over an ordered (image, duration) list.
    Concat,
    /// One filter graph chaining every clip through blend/concat nodes.
    Xfade,
    /// Per-clip segments folded pairwise, then a final encode.
    Segmented,
}

/// Encoder rate control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateControl {
    /// Constant rate factor (lower is better quality).
    Crf(u8),
    /// Target bitrate in kbit/s.
    BitrateKbps(u32),
}

/// Quality knobs. GIF output ignores both.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Quality {
    /// Rate control mode.
    pub rate: RateControl,
    /// Speed/quality preset name (`ultrafast` .. `veryslow`).
    pub preset: String,
}

impl Default for Quality {
    fn default() -> Self {
        Self {
            rate: RateControl::Crf(23),
            preset: "medium".to_string(),
        }
    }
}

/// Preset names accepted for every lossy format.
pub const PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

/// One export job: the project plus output parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRequest {
    /// Clips with their durations/transitions and image payloads.
    pub project: Project,
    /// Output format.
    pub format: OutputFormat,
    /// Output frame rate.
    pub fps: Fps,
    /// Output width/height.
    pub canvas: Canvas,
    /// Strategy selector.
    pub strategy: StrategySelector,
    /// Quality knobs.
    pub quality: Quality,
}

impl ExportRequest {
    /// Request with default strategy and quality.
    pub fn new(project: Project, format: OutputFormat, fps: Fps, canvas: Canvas) -> Self {
        Self {
            project,
            format,
            fps,
            canvas,
            strategy: StrategySelector::Auto,
            quality: Quality::default(),
        }
    }

    /// Check everything that can be checked without the encoder and pick the strategy.
    ///
    /// Any malformed clip rejects the whole request.
    pub fn validate(&self) -> ReelResult<Strategy> {
        let timeline = &self.project.timeline;
        if timeline.is_empty() {
            return Err(ReelError::validation("export needs at least one clip"));
        }
        // Re-validate: both may have been built without their constructors.
        let fps = Fps::new(self.fps.num, self.fps.den)?;
        let canvas = Canvas::new(self.canvas.width, self.canvas.height)?;
        if self.format.needs_even_size()
            && (!canvas.width.is_multiple_of(2) || !canvas.height.is_multiple_of(2))
        {
            return Err(ReelError::validation(format!(
                "{} output needs even width/height, got {}x{}",
                self.format.extension(),
                canvas.width,
                canvas.height
            )));
        }
        self.validate_quality()?;

        for clip in timeline.clips() {
            if clip.duration_ms == 0 || clip.duration_ms > MAX_CLIP_DURATION_MS {
                return Err(ReelError::validation(format!(
                    "clip '{}' duration {}ms is outside 1..={MAX_CLIP_DURATION_MS}ms",
                    clip.id, clip.duration_ms
                )));
            }
            let bytes = self.project.images.require(&clip.image).map_err(|_| {
                ReelError::validation(format!(
                    "clip '{}' references missing image '{}'",
                    clip.id, clip.image
                ))
            })?;
            image_extension(bytes)
                .map_err(|e| ReelError::validation(format!("clip '{}': {e}", clip.id)))?;
        }

        let has_blends = QuantizedTimeline::new(&timeline.timings(), fps).has_blends();
        Ok(match self.strategy {
            StrategySelector::Auto if has_blends => Strategy::Segmented,
            StrategySelector::Auto => Strategy::Concat,
            StrategySelector::Concat if has_blends => {
                return Err(ReelError::validation(
                    "concat strategy cannot render transitions; use auto, xfade or segmented",
                ));
            }
            StrategySelector::Concat => Strategy::Concat,
            StrategySelector::Xfade => Strategy::Xfade,
            StrategySelector::Segmented => Strategy::Segmented,
        })
    }

    fn validate_quality(&self) -> ReelResult<()> {
        if self.format == OutputFormat::Gif {
            return Ok(());
        }
        match self.quality.rate {
            RateControl::Crf(crf) => {
                let max = match self.format {
                    OutputFormat::Webm => 63,
                    _ => 51,
                };
                if crf > max {
                    return Err(ReelError::validation(format!(
                        "crf {crf} out of range 0..={max} for {}",
                        self.format.extension()
                    )));
                }
            }
            RateControl::BitrateKbps(0) => {
                return Err(ReelError::validation("bitrate must be > 0 kbit/s"));
            }
            RateControl::BitrateKbps(_) => {}
        }
        if !PRESETS.contains(&self.quality.preset.as_str()) {
            return Err(ReelError::validation(format!(
                "unknown preset '{}'",
                self.quality.preset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/request.rs"]
mod tests;
