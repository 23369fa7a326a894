use crate::{
    foundation::core::Fps,
    foundation::error::{ReelError, ReelResult},
    timeline::model::{Clip, Timeline},
    timeline::project::{ImageLibrary, Project},
};

/// Display duration given to freshly ingested clips.
pub const DEFAULT_CLIP_DURATION_MS: u64 = 3000;

/// One decoded-elsewhere image handed over by the ingestion collaborator.
#[derive(Clone, Debug)]
pub struct IngestImage {
    /// Encoded image bytes (PNG, JPEG, ...).
    pub bytes: Vec<u8>,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
}

impl IngestImage {
    /// Read the natural size from the encoded header.
    pub fn from_bytes(bytes: Vec<u8>) -> ReelResult<Self> {
        let (width, height) = image::ImageReader::new(std::io::Cursor::new(&bytes))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| ReelError::validation(format!("unreadable image header: {e}")))?;
        Ok(Self {
            bytes,
            width,
            height,
        })
    }
}

/// Ingestion knobs.
#[derive(Clone, Copy, Debug)]
pub struct IngestOpts {
    /// Duration assigned to every clip.
    pub default_duration_ms: u64,
    /// Editing frame rate of the produced timeline.
    pub fps: Fps,
}

impl Default for IngestOpts {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_CLIP_DURATION_MS,
            fps: Fps::default(),
        }
    }
}

/// File extension for encoded image bytes, sniffed from the header.
pub fn image_extension(bytes: &[u8]) -> ReelResult<&'static str> {
    let format = image::guess_format(bytes)
        .map_err(|e| ReelError::validation(format!("unrecognized image payload: {e}")))?;
    format
        .extensions_str()
        .first()
        .copied()
        .ok_or_else(|| ReelError::validation("image format has no known file extension"))
}

/// Build a project from an ordered list of images: default durations, no transitions.
///
/// Any unreadable image rejects the whole batch.
pub fn ingest(images: Vec<IngestImage>, opts: IngestOpts) -> ReelResult<Project> {
    let mut timeline = Timeline::new(opts.fps);
    let mut library = ImageLibrary::new();
    for (i, img) in images.into_iter().enumerate() {
        if img.width == 0 || img.height == 0 {
            return Err(ReelError::validation(format!(
                "image {i} has zero width or height"
            )));
        }
        let ext = image_extension(&img.bytes)
            .map_err(|e| ReelError::validation(format!("image {i}: {e}")))?;
        let id = format!("clip-{:03}", i + 1);
        let filename = format!("{id}.{ext}");
        timeline.push(Clip::new(
            id,
            filename.clone(),
            img.width,
            img.height,
            opts.default_duration_ms,
        ))?;
        library.insert(filename, img.bytes);
    }
    tracing::debug!(clips = timeline.len(), "ingested images");
    Ok(Project {
        timeline,
        images: library,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/ingest.rs"]
mod tests;
