//! Export plans: the files to stage and the encoder invocations to run, as plain data.
//!
//! Building a plan never touches the filesystem or spawns anything, so every argument vector can
//! be inspected in tests without an encoder installed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    export::request::{ExportRequest, OutputFormat, Quality, RateControl, Strategy},
    export::strategy,
    foundation::core::{Canvas, Fps},
    foundation::error::{ReelError, ReelResult},
    timeline::ingest::image_extension,
    timing::quantize::padded_input_secs,
    timing::schedule::QuantizedTimeline,
};

/// A file the job writes into its working directory before the first step.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanFile {
    /// Absolute destination path.
    pub path: PathBuf,
    /// File contents.
    pub contents: Arc<Vec<u8>>,
}

/// Where a step's result goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutput {
    /// An intermediate file consumed by later steps.
    File(PathBuf),
    /// The delivered artifact, streamed on stdout.
    Stdout,
}

/// One encoder invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Short description used for progress and logs.
    pub label: String,
    /// Arguments after the program name.
    pub args: Vec<String>,
    /// Result destination.
    pub output: StepOutput,
    /// Intermediates no longer needed once this step succeeded.
    pub discard_after: Vec<PathBuf>,
}

/// Everything needed to run one export job.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportPlan {
    /// Strategy the steps implement.
    pub strategy: Strategy,
    /// Delivered format.
    pub format: OutputFormat,
    /// Output frame rate.
    pub fps: Fps,
    /// Frame-quantized timeline the steps were derived from.
    pub timeline: QuantizedTimeline,
    /// Files staged before the first step.
    pub files: Vec<PlanFile>,
    /// Invocations, run strictly in order; the last one writes to stdout.
    pub steps: Vec<Step>,
}

impl ExportPlan {
    /// Build the plan for a validated request, staging files under `dir`.
    pub fn build(req: &ExportRequest, strategy: Strategy, dir: &Path) -> ReelResult<Self> {
        let timeline = QuantizedTimeline::new(&req.project.timeline.timings(), req.fps);
        if timeline.clips.is_empty() {
            return Err(ReelError::validation("export needs at least one clip"));
        }

        let clips = req.project.timeline.clips();
        let mut sources = Vec::with_capacity(clips.len());
        for clip in clips {
            let bytes = req.project.images.require(&clip.image)?;
            sources.push((bytes, image_extension(bytes)?));
        }
        // The concat demuxer decodes every entry with the first entry's codec.
        let transcode = strategy == Strategy::Concat
            && sources.windows(2).any(|w| w[0].1 != w[1].1);
        if transcode {
            tracing::debug!("mixed image formats, staging every image as png");
        }

        let mut files = Vec::with_capacity(sources.len() + 1);
        let mut images = Vec::with_capacity(sources.len());
        for (i, (bytes, ext)) in sources.into_iter().enumerate() {
            let (contents, ext) = if transcode {
                (Arc::new(reencode_png(bytes)?), "png")
            } else {
                (Arc::clone(bytes), ext)
            };
            let path = dir.join(format!("img_{i:03}.{ext}"));
            files.push(PlanFile {
                path: path.clone(),
                contents,
            });
            images.push(path);
        }

        let ctx = PlanContext {
            dir,
            timeline: &timeline,
            images: &images,
            canvas: req.canvas,
            fps: req.fps,
            format: req.format,
            quality: &req.quality,
        };
        let (extra_files, steps) = match strategy {
            Strategy::Concat => strategy::concat(&ctx),
            Strategy::Xfade => strategy::xfade(&ctx),
            Strategy::Segmented => strategy::segmented(&ctx),
        };
        files.extend(extra_files);

        tracing::debug!(
            ?strategy,
            steps = steps.len(),
            total_frames = timeline.total_frames(),
            "export plan built"
        );
        Ok(Self {
            strategy,
            format: req.format,
            fps: req.fps,
            timeline,
            files,
            steps,
        })
    }

    /// Output length in frames.
    pub fn total_frames(&self) -> u64 {
        self.timeline.total_frames()
    }

    /// Output length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.timeline.total_secs()
    }
}

fn reencode_png(bytes: &[u8]) -> ReelResult<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ReelError::validation(format!("image cannot be decoded: {e}")))?;
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| ReelError::io(format!("re-encode image as png: {e}")))?;
    Ok(out.into_inner())
}

/// Inputs shared by the strategy builders.
pub(crate) struct PlanContext<'a> {
    pub(crate) dir: &'a Path,
    pub(crate) timeline: &'a QuantizedTimeline,
    pub(crate) images: &'a [PathBuf],
    pub(crate) canvas: Canvas,
    pub(crate) fps: Fps,
    pub(crate) format: OutputFormat,
    pub(crate) quality: &'a Quality,
}

impl PlanContext<'_> {
    /// Letterbox into the canvas and resample to the output rate.
    pub(crate) fn fit_chain(&self) -> String {
        let Canvas { width: w, height: h } = self.canvas;
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1,fps={},format=yuv444p",
            self.fps.to_ffmpeg_rate()
        )
    }

    /// A still image looped long enough to cover `frames` (plus one frame of slack).
    pub(crate) fn looped_input(&self, image: &Path, frames: u64) -> Vec<String> {
        strings(&[
            "-loop",
            "1",
            "-framerate",
            &self.fps.to_ffmpeg_rate(),
            // Ceil-padded: trims downstream cut the exact frame count.
            "-t",
            &padded_input_secs(frames, self.fps),
            "-i",
            &path_arg(image),
        ])
    }

    /// Arguments that deliver the final artifact on stdout.
    pub(crate) fn delivery_args(&self) -> Vec<String> {
        delivery_args(self.format, self.quality)
    }

    /// Palette chain appended for GIF output, reading `input` and writing `output` labels.
    pub(crate) fn palette_chain(&self, input: &str, output: &str) -> Option<String> {
        (self.format == OutputFormat::Gif).then(|| {
            format!("{input}split[g0][g1];[g0]palettegen[pal];[g1][pal]paletteuse{output}")
        })
    }
}

/// Options every invocation starts with.
pub(crate) fn global_args() -> Vec<String> {
    strings(&["-hide_banner", "-nostdin", "-loglevel", "error", "-y"])
}

/// Lossless intermediate encoding.
pub(crate) fn intermediate_args(out: &Path) -> Vec<String> {
    strings(&["-an", "-c:v", "ffv1", &path_arg(out)])
}

/// Codec, rate control and container for the delivered artifact, ending in `pipe:1`.
pub fn delivery_args(format: OutputFormat, quality: &Quality) -> Vec<String> {
    let mut args = strings(&["-an"]);
    match format {
        OutputFormat::Mp4 => {
            args.extend(strings(&["-c:v", "libx264", "-preset", &quality.preset]));
            match quality.rate {
                RateControl::Crf(crf) => args.extend(strings(&["-crf", &crf.to_string()])),
                RateControl::BitrateKbps(k) => args.extend(strings(&["-b:v", &format!("{k}k")])),
            }
            // Fragmented: a pipe cannot seek back to write the moov atom.
            args.extend(strings(&[
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "frag_keyframe+empty_moov+default_base_moof",
                "-f",
                "mp4",
            ]));
        }
        OutputFormat::Webm => {
            args.extend(strings(&[
                "-c:v",
                "libvpx-vp9",
                "-deadline",
                vp9_deadline(&quality.preset),
            ]));
            match quality.rate {
                RateControl::Crf(crf) => {
                    args.extend(strings(&["-crf", &crf.to_string(), "-b:v", "0"]))
                }
                RateControl::BitrateKbps(k) => args.extend(strings(&["-b:v", &format!("{k}k")])),
            }
            args.extend(strings(&["-pix_fmt", "yuv420p", "-f", "webm"]));
        }
        OutputFormat::Gif => args.extend(strings(&["-loop", "0", "-f", "gif"])),
    }
    args.push("pipe:1".to_string());
    args
}

fn vp9_deadline(preset: &str) -> &'static str {
    match preset {
        "ultrafast" | "superfast" | "veryfast" => "realtime",
        "veryslow" => "best",
        _ => "good",
    }
}

pub(crate) fn path_arg(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/export/plan.rs"]
mod tests;
