//! Per-tick frame rendering for a play head position in milliseconds.

use crate::{
    assets::PreparedImage,
    effects::kernels::{self, BLACK},
    effects::transitions::{Blend, resolve_blend},
    foundation::core::{Canvas, FrameRGBA},
    foundation::error::{ReelError, ReelResult},
    preview::cache::ImageCache,
    timeline::model::Timeline,
    timing::schedule::{ClipTiming, PlayheadState, locate_ms},
};

struct Slot {
    image: PreparedImage,
    blend: Option<Blend>,
}

/// Immutable snapshot of a timeline, ready to render any instant.
///
/// Rebuild after editing the timeline; a tick costs one linear scan over the clips.
pub struct PreviewCompositor {
    canvas: Canvas,
    timings: Vec<ClipTiming>,
    slots: Vec<Slot>,
}

impl PreviewCompositor {
    /// Resolve every clip's image and blend up front.
    pub fn new(timeline: &Timeline, cache: &ImageCache, canvas: Canvas) -> ReelResult<Self> {
        let timings = timeline.timings();
        let mut slots = Vec::with_capacity(timeline.len());
        for (clip, timing) in timeline.clips().iter().zip(&timings) {
            let image = cache.get(&clip.image).cloned().ok_or_else(|| {
                ReelError::validation(format!(
                    "clip '{}' image '{}' was not prepared",
                    clip.id, clip.image
                ))
            })?;
            let blend = timing.transition.as_ref().map(resolve_blend).transpose()?;
            slots.push(Slot { image, blend });
        }
        Ok(Self {
            canvas,
            timings,
            slots,
        })
    }

    /// Output box.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Loop length in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.timings.iter().map(|t| t.duration_ms).sum()
    }

    /// What is visible at `t_ms` (wrapped modulo the loop length).
    pub fn state_at(&self, t_ms: f64) -> Option<PlayheadState> {
        locate_ms(&self.timings, t_ms)
    }

    /// Render into `dst`, reusing its allocation. An empty timeline renders black.
    pub fn render_into(&self, t_ms: f64, dst: &mut FrameRGBA) -> Option<PlayheadState> {
        if dst.width != self.canvas.width || dst.height != self.canvas.height {
            *dst = FrameRGBA::filled(self.canvas, BLACK);
        }
        let Some(state) = self.state_at(t_ms) else {
            kernels::fill(dst, BLACK, 1.0);
            return None;
        };
        match state {
            PlayheadState::Solo { clip } => kernels::compose_solo(dst, &self.slots[clip].image),
            PlayheadState::Transition { from, to, progress, .. } => {
                let blend = self.slots[from].blend.unwrap_or(Blend::Cut);
                kernels::compose_transition(
                    dst,
                    &self.slots[from].image,
                    &self.slots[to].image,
                    blend,
                    progress,
                );
            }
        }
        Some(state)
    }

    /// Render a fresh frame at `t_ms`.
    pub fn render_at(&self, t_ms: f64) -> FrameRGBA {
        let mut frame = FrameRGBA::filled(self.canvas, BLACK);
        self.render_into(t_ms, &mut frame);
        frame
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/compositor.rs"]
mod tests;
