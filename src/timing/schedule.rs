//! Where the play head is: the positional model shared by preview and export.
//!
//! Duration model: a timeline lasts `Σ duration`. A transition occupies the last
//! `transition` of the outgoing clip's slot; the incoming clip then plays its full duration.

use crate::{
    effects::transitions::{TransitionKind, TransitionSpec},
    foundation::core::{FrameIndex, Fps},
    foundation::math::clamp01,
    timing::quantize::{QuantizeMode, ms_to_frames},
};

/// Timing facts of one clip, independent of where the clip came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipTiming {
    /// Display duration in milliseconds.
    pub duration_ms: u64,
    /// Outgoing transition, already filtered to blending transitions (never set on the last clip).
    pub transition: Option<TransitionSpec>,
}

/// What is visible at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayheadState {
    /// One clip drawn alone.
    Solo {
        /// Active clip index.
        clip: usize,
    },
    /// Two adjacent clips mid-blend.
    Transition {
        /// Outgoing clip index.
        from: usize,
        /// Incoming clip index (`from + 1`).
        to: usize,
        /// Transition kind.
        kind: TransitionKind,
        /// Blend ratio in `[0, 1]`.
        progress: f64,
    },
}

impl PlayheadState {
    /// Clip that owns the current slot (the outgoing clip during a transition).
    pub fn active_clip(&self) -> usize {
        match *self {
            Self::Solo { clip } => clip,
            Self::Transition { from, .. } => from,
        }
    }
}

/// Locate `t_ms` (wrapped modulo the total duration) on a continuous millisecond timeline.
///
/// Linear scan; `None` for an empty or zero-length timeline.
pub fn locate_ms(timings: &[ClipTiming], t_ms: f64) -> Option<PlayheadState> {
    let total = timings
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.duration_ms));
    if total == 0 || !t_ms.is_finite() {
        return None;
    }
    let t = t_ms.rem_euclid(total as f64);

    let mut acc = 0.0f64;
    for (i, clip) in timings.iter().enumerate() {
        let dur = clip.duration_ms as f64;
        if t < acc + dur || i + 1 == timings.len() {
            let local = t - acc;
            if let Some(tr) = clip.transition.as_ref().filter(|_| i + 1 < timings.len()) {
                let tr_ms = tr.duration_ms as f64;
                let start = dur - tr_ms;
                if tr_ms > 0.0 && local >= start {
                    return Some(PlayheadState::Transition {
                        from: i,
                        to: i + 1,
                        kind: tr.kind,
                        progress: clamp01((local - start) / tr_ms),
                    });
                }
            }
            return Some(PlayheadState::Solo { clip: i });
        }
        acc += dur;
    }
    None
}

/// One clip after frame quantization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantizedClip {
    /// First frame of the clip's slot.
    pub start: FrameIndex,
    /// Slot length in frames, always `>= 1`.
    pub frames: u64,
    /// Frames at the end of the slot spent blending into the next clip.
    pub transition_frames: u64,
    /// Blend kind when `transition_frames > 0`.
    pub transition: Option<TransitionKind>,
}

/// Frame-quantized timeline used to build every export invocation.
///
/// Boundaries are rounded as absolute positions (`round(Σ durations)`), never as a running sum
/// of individually rounded durations, so rounding error does not accumulate with clip count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantizedTimeline {
    /// Export frame rate.
    pub fps: Fps,
    /// Quantized clips in playback order.
    pub clips: Vec<QuantizedClip>,
}

impl QuantizedTimeline {
    /// Quantize `timings` at `fps`.
    pub fn new(timings: &[ClipTiming], fps: Fps) -> Self {
        let mut clips = Vec::with_capacity(timings.len());
        let mut end_ms = 0u64;
        let mut start = 0u64;
        for (i, clip) in timings.iter().enumerate() {
            end_ms = end_ms.saturating_add(clip.duration_ms);
            // Round: clip boundary.
            let end = ms_to_frames(end_ms, fps, QuantizeMode::Round)
                .max(start.saturating_add(1));
            let frames = end - start;

            let (transition_frames, transition) = match clip
                .transition
                .as_ref()
                .filter(|t| t.is_blending() && i + 1 < timings.len())
            {
                Some(t) => {
                    // Round: transition length; leave at least one solo frame in the slot.
                    let tf = ms_to_frames(t.duration_ms, fps, QuantizeMode::Round)
                        .min(frames.saturating_sub(1));
                    if tf == 0 {
                        tracing::debug!(
                            clip = i,
                            transition_ms = t.duration_ms,
                            "transition shorter than one frame, exporting as a cut"
                        );
                        (0, None)
                    } else {
                        (tf, Some(t.kind))
                    }
                }
                None => (0, None),
            };

            clips.push(QuantizedClip {
                start: FrameIndex(start),
                frames,
                transition_frames,
                transition,
            });
            start = end;
        }
        Self { fps, clips }
    }

    /// Total output length in frames.
    pub fn total_frames(&self) -> u64 {
        self.clips
            .last()
            .map(|c| c.start.0.saturating_add(c.frames))
            .unwrap_or(0)
    }

    /// Total output length in seconds.
    pub fn total_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames())
    }

    /// Return `true` when at least one clip blends into its successor.
    pub fn has_blends(&self) -> bool {
        self.clips.iter().any(|c| c.transition_frames > 0)
    }

    /// What an exported frame shows. Progress is sampled at the frame's presentation time.
    pub fn state_at_frame(&self, idx: FrameIndex) -> Option<PlayheadState> {
        let i = self
            .clips
            .iter()
            .position(|c| idx.0 >= c.start.0 && idx.0 < c.start.0.saturating_add(c.frames))?;
        let clip = &self.clips[i];
        let local = idx.0 - clip.start.0;
        let blend_start = clip.frames - clip.transition_frames;
        match clip.transition {
            Some(kind) if clip.transition_frames > 0 && local >= blend_start => {
                Some(PlayheadState::Transition {
                    from: i,
                    to: i + 1,
                    kind,
                    progress: clamp01(
                        (local - blend_start) as f64 / clip.transition_frames as f64,
                    ),
                })
            }
            _ => Some(PlayheadState::Solo { clip: i }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/schedule.rs"]
mod tests;
