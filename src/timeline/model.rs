use crate::{
    effects::transitions::TransitionSpec,
    foundation::core::Fps,
    foundation::error::{ReelError, ReelResult},
    timing::quantize::min_frame_gap_ms,
    timing::schedule::ClipTiming,
};

/// Longest display duration a clip can hold (24 hours).
pub const MAX_CLIP_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

/// One still image plus its display duration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Identifier, unique within a timeline.
    pub id: String,
    /// Image reference: a key into the project's image library (the archive filename).
    #[serde(rename = "filename")]
    pub image: String,
    /// Natural image width in pixels.
    pub width: u32,
    /// Natural image height in pixels.
    pub height: u32,
    /// Display duration in milliseconds, in `1..=MAX_CLIP_DURATION_MS`.
    pub duration_ms: u64,
    /// Optional blend into the next clip. Ignored on the last clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_after: Option<TransitionSpec>,
}

impl Clip {
    /// Clip without a transition.
    pub fn new(
        id: impl Into<String>,
        image: impl Into<String>,
        width: u32,
        height: u32,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            width,
            height,
            duration_ms,
            transition_after: None,
        }
    }

    /// Builder-style transition setter.
    pub fn with_transition(mut self, spec: TransitionSpec) -> Self {
        self.transition_after = Some(spec);
        self
    }
}

/// Ordered clip sequence; order is playback order.
///
/// Every mutator keeps the duration invariant: a clip with a blending outgoing transition lasts
/// at least one frame interval (at [`Timeline::fps`]) longer than that transition. Edits that
/// would break it extend the clip instead of failing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    /// Editing frame rate that defines the minimum frame interval.
    #[serde(default)]
    pub fps: Fps,
    clips: Vec<Clip>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(Fps::default())
    }
}

impl Timeline {
    /// Empty timeline at `fps`.
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            clips: Vec::new(),
        }
    }

    /// Build from clips, clamping durations as needed.
    pub fn from_clips(fps: Fps, clips: Vec<Clip>) -> ReelResult<Self> {
        let mut out = Self::new(fps);
        for clip in clips {
            out.push(clip)?;
        }
        Ok(out)
    }

    /// Borrow the clip list.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Return `true` when the timeline has no clips.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clip by index.
    pub fn clip(&self, idx: usize) -> Option<&Clip> {
        self.clips.get(idx)
    }

    /// Index of the clip with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    /// Append a clip.
    pub fn push(&mut self, clip: Clip) -> ReelResult<()> {
        let idx = self.clips.len();
        self.insert(idx, clip)
    }

    /// Insert a clip at `idx` (`idx == len` appends).
    pub fn insert(&mut self, idx: usize, mut clip: Clip) -> ReelResult<()> {
        if idx > self.clips.len() {
            return Err(ReelError::validation(format!(
                "insert index {idx} out of range (len {})",
                self.clips.len()
            )));
        }
        if clip.id.trim().is_empty() {
            return Err(ReelError::validation("clip id must be non-empty"));
        }
        if self.position(&clip.id).is_some() {
            return Err(ReelError::validation(format!(
                "duplicate clip id '{}'",
                clip.id
            )));
        }
        fit_clip(self.fps, &mut clip);
        self.clips.insert(idx, clip);
        Ok(())
    }

    /// Remove and return the clip at `idx`.
    pub fn remove(&mut self, idx: usize) -> ReelResult<Clip> {
        self.check_index(idx)?;
        Ok(self.clips.remove(idx))
    }

    /// Move the clip at `from` so that it ends up at index `to`.
    pub fn move_clip(&mut self, from: usize, to: usize) -> ReelResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let clip = self.clips.remove(from);
        self.clips.insert(to, clip);
        Ok(())
    }

    /// Reorder to match an explicit id sequence, which must be a permutation of current ids.
    pub fn apply_order<S: AsRef<str>>(&mut self, ids: &[S]) -> ReelResult<()> {
        if ids.len() != self.clips.len() {
            return Err(ReelError::validation(format!(
                "order lists {} ids but timeline has {} clips",
                ids.len(),
                self.clips.len()
            )));
        }
        let mut taken = vec![false; self.clips.len()];
        let mut indices = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            let idx = self
                .position(id)
                .filter(|&i| !taken[i])
                .ok_or_else(|| {
                    ReelError::validation(format!(
                        "order references unknown or repeated clip id '{id}'"
                    ))
                })?;
            taken[idx] = true;
            indices.push(idx);
        }
        let mut slots: Vec<Option<Clip>> = self.clips.drain(..).map(Some).collect();
        self.clips = indices
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        Ok(())
    }

    /// Set a clip's duration; returns the effective (possibly extended) duration.
    pub fn set_duration(&mut self, idx: usize, duration_ms: u64) -> ReelResult<u64> {
        self.check_index(idx)?;
        let fps = self.fps;
        let clip = &mut self.clips[idx];
        clip.duration_ms = duration_ms;
        let effective = fit_clip(fps, clip);
        if effective != duration_ms {
            tracing::debug!(
                clip = %clip.id,
                requested_ms = duration_ms,
                effective_ms = effective,
                "duration adjusted to fit outgoing transition and bounds"
            );
        }
        Ok(effective)
    }

    /// Attach (or replace) the outgoing transition; returns the clip's effective duration.
    pub fn set_transition(&mut self, idx: usize, spec: TransitionSpec) -> ReelResult<u64> {
        self.check_index(idx)?;
        let fps = self.fps;
        let clip = &mut self.clips[idx];
        clip.transition_after = Some(spec);
        Ok(fit_clip(fps, clip))
    }

    /// Remove the outgoing transition; durations are left unchanged.
    pub fn clear_transition(&mut self, idx: usize) -> ReelResult<Option<TransitionSpec>> {
        self.check_index(idx)?;
        Ok(self.clips[idx].transition_after.take())
    }

    /// Change the editing frame rate and re-apply the duration invariant.
    pub fn set_fps(&mut self, fps: Fps) {
        self.fps = fps;
        self.enforce_invariants();
    }

    /// Drop every clip.
    pub fn clear(&mut self) {
        self.clips.clear();
    }

    /// Sum of clip durations; transitions overlap inside the outgoing clip's slot.
    pub fn total_duration_ms(&self) -> u64 {
        sum_ms(&self.clips)
    }

    /// Timeline start of clip `idx`.
    pub fn clip_start_ms(&self, idx: usize) -> Option<u64> {
        if idx >= self.clips.len() {
            return None;
        }
        Some(sum_ms(&self.clips[..idx]))
    }

    /// Outgoing transition of `idx` when it actually blends into a following clip.
    pub fn effective_transition(&self, idx: usize) -> Option<&TransitionSpec> {
        if idx + 1 >= self.clips.len() {
            return None;
        }
        self.clips[idx]
            .transition_after
            .as_ref()
            .filter(|t| t.is_blending())
    }

    /// Return `true` when any clip blends into its successor.
    pub fn has_usable_transitions(&self) -> bool {
        (0..self.clips.len()).any(|i| self.effective_transition(i).is_some())
    }

    /// Timing view of the clip list, with non-blending and trailing transitions dropped.
    pub fn timings(&self) -> Vec<ClipTiming> {
        (0..self.clips.len())
            .map(|i| ClipTiming {
                duration_ms: self.clips[i].duration_ms,
                transition: self.effective_transition(i).cloned(),
            })
            .collect()
    }

    pub(crate) fn enforce_invariants(&mut self) {
        let fps = self.fps;
        for clip in &mut self.clips {
            fit_clip(fps, clip);
        }
    }

    fn check_index(&self, idx: usize) -> ReelResult<()> {
        if idx >= self.clips.len() {
            return Err(ReelError::validation(format!(
                "clip index {idx} out of range (len {})",
                self.clips.len()
            )));
        }
        Ok(())
    }
}

fn sum_ms(clips: &[Clip]) -> u64 {
    clips
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.duration_ms))
}

// Caps the outgoing transition so the clip can still outlast it, then clamps the duration into
// `[transition + gap, MAX_CLIP_DURATION_MS]`. Returns the effective duration.
fn fit_clip(fps: Fps, clip: &mut Clip) -> u64 {
    let gap = min_frame_gap_ms(fps);
    if let Some(t) = clip.transition_after.as_mut() {
        t.duration_ms = t.duration_ms.min(MAX_CLIP_DURATION_MS.saturating_sub(gap));
    }
    clip.duration_ms = clamped_duration(gap, clip.duration_ms, clip);
    clip.duration_ms
}

fn clamped_duration(gap: u64, requested_ms: u64, clip: &Clip) -> u64 {
    let floor = match clip.transition_after.as_ref().filter(|t| t.is_blending()) {
        Some(t) => t.duration_ms.saturating_add(gap),
        None => gap,
    };
    requested_ms.max(floor).min(MAX_CLIP_DURATION_MS)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
