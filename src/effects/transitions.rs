use std::str::FromStr;

use crate::foundation::error::{ReelError, ReelResult};

/// Direction of travel for slide and wipe transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Content moves toward the left edge.
    Left,
    /// Content moves toward the right edge.
    Right,
    /// Content moves toward the top edge.
    Up,
    /// Content moves toward the bottom edge.
    Down,
}

/// Transition kind between two adjacent clips.
///
/// This table is the single source of truth for the preview kernels and for the encoder's
/// transition names, so both renderers agree on what a kind means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TransitionKind {
    /// Hard cut; degenerates to concatenation everywhere.
    #[serde(rename = "cut")]
    Cut,
    /// Alpha cross-fade.
    #[serde(rename = "fade")]
    Fade,
    /// Fade out to black, then in from black.
    #[serde(rename = "fadeToBlack")]
    FadeToBlack,
    /// Fade out to white, then in from white.
    #[serde(rename = "fadeToWhite")]
    FadeToWhite,
    /// Push both images left.
    #[serde(rename = "slide-left")]
    SlideLeft,
    /// Push both images right.
    #[serde(rename = "slide-right")]
    SlideRight,
    /// Push both images up.
    #[serde(rename = "slide-up")]
    SlideUp,
    /// Push both images down.
    #[serde(rename = "slide-down")]
    SlideDown,
    /// Reveal the incoming image with an edge travelling left.
    #[serde(rename = "wipe-left")]
    WipeLeft,
    /// Reveal the incoming image with an edge travelling right.
    #[serde(rename = "wipe-right")]
    WipeRight,
    /// Reveal the incoming image with an edge travelling up.
    #[serde(rename = "wipe-up")]
    WipeUp,
    /// Reveal the incoming image with an edge travelling down.
    #[serde(rename = "wipe-down")]
    WipeDown,
    /// Alias of [`TransitionKind::Fade`]; no per-pixel stochastic reveal.
    #[serde(rename = "dissolve")]
    Dissolve,
    /// Blocky cross-fade through growing/shrinking pixel blocks.
    #[serde(rename = "pixelate")]
    Pixelate,
}

impl TransitionKind {
    /// Every supported kind, in a stable order.
    pub const ALL: [TransitionKind; 14] = [
        Self::Cut,
        Self::Fade,
        Self::FadeToBlack,
        Self::FadeToWhite,
        Self::SlideLeft,
        Self::SlideRight,
        Self::SlideUp,
        Self::SlideDown,
        Self::WipeLeft,
        Self::WipeRight,
        Self::WipeUp,
        Self::WipeDown,
        Self::Dissolve,
        Self::Pixelate,
    ];

    /// Canonical name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Fade => "fade",
            Self::FadeToBlack => "fadeToBlack",
            Self::FadeToWhite => "fadeToWhite",
            Self::SlideLeft => "slide-left",
            Self::SlideRight => "slide-right",
            Self::SlideUp => "slide-up",
            Self::SlideDown => "slide-down",
            Self::WipeLeft => "wipe-left",
            Self::WipeRight => "wipe-right",
            Self::WipeUp => "wipe-up",
            Self::WipeDown => "wipe-down",
            Self::Dissolve => "dissolve",
            Self::Pixelate => "pixelate",
        }
    }

    /// Return `true` for kinds that never blend.
    pub fn is_cut(self) -> bool {
        matches!(self, Self::Cut)
    }

    /// Name of the matching `xfade` transition, `None` for a cut.
    ///
    /// `dissolve` maps to `fade` because the preview renders it as a plain cross-fade.
    pub fn xfade_name(self) -> Option<&'static str> {
        Some(match self {
            Self::Cut => return None,
            Self::Fade | Self::Dissolve => "fade",
            Self::FadeToBlack => "fadeblack",
            Self::FadeToWhite => "fadewhite",
            Self::SlideLeft => "slideleft",
            Self::SlideRight => "slideright",
            Self::SlideUp => "slideup",
            Self::SlideDown => "slidedown",
            Self::WipeLeft => "wipeleft",
            Self::WipeRight => "wiperight",
            Self::WipeUp => "wipeup",
            Self::WipeDown => "wipedown",
            Self::Pixelate => "pixelize",
        })
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionKind {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = s.trim().to_ascii_lowercase().replace('_', "-");
        if kind.is_empty() {
            return Err(ReelError::validation("transition kind must be non-empty"));
        }

        Ok(match kind.as_str() {
            "cut" | "none" => Self::Cut,
            "fade" | "crossfade" => Self::Fade,
            "fadetoblack" | "fade-to-black" | "fadeblack" => Self::FadeToBlack,
            "fadetowhite" | "fade-to-white" | "fadewhite" => Self::FadeToWhite,
            "slide-left" | "slideleft" => Self::SlideLeft,
            "slide-right" | "slideright" => Self::SlideRight,
            "slide-up" | "slideup" => Self::SlideUp,
            "slide-down" | "slidedown" => Self::SlideDown,
            "wipe-left" | "wipeleft" => Self::WipeLeft,
            "wipe-right" | "wiperight" => Self::WipeRight,
            "wipe-up" | "wipeup" => Self::WipeUp,
            "wipe-down" | "wipedown" => Self::WipeDown,
            "dissolve" => Self::Dissolve,
            "pixelate" | "pixelize" => Self::Pixelate,
            other => {
                return Err(ReelError::validation(format!(
                    "unknown transition kind '{other}'"
                )));
            }
        })
    }
}

/// Timed transition attached to the end of a clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSpec {
    /// Transition kind.
    pub kind: TransitionKind,
    /// Length of the blend in milliseconds.
    pub duration_ms: u64,
    /// Kind-specific parameters (`pixelate`: `{ "maxBlock": 32 }`).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl TransitionSpec {
    /// Transition without parameters.
    pub fn new(kind: TransitionKind, duration_ms: u64) -> Self {
        Self {
            kind,
            duration_ms,
            params: serde_json::Value::Null,
        }
    }

    /// Return `true` when this transition actually blends two clips.
    pub fn is_blending(&self) -> bool {
        !self.kind.is_cut() && self.duration_ms > 0
    }
}

/// Default largest block edge for `pixelate`.
pub const DEFAULT_PIXELATE_MAX_BLOCK: u32 = 32;

/// Resolved blend shape consumed by the preview kernels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Blend {
    /// No blend.
    Cut,
    /// Outgoing at `1 - p`, incoming at `p`.
    Crossfade,
    /// Two-stage fade through an opaque straight-alpha color.
    ThroughColor([u8; 4]),
    /// Both images translate in `Direction`.
    Slide(Direction),
    /// Incoming revealed by a rectangle growing in `Direction`.
    Wipe(Direction),
    /// Block-size ramp between `1` and `max_block`.
    Pixelate {
        /// Largest block edge in pixels.
        max_block: u32,
    },
}

/// Resolve a spec into its blend shape, validating kind-specific params.
pub fn resolve_blend(spec: &TransitionSpec) -> ReelResult<Blend> {
    Ok(match spec.kind {
        TransitionKind::Cut => Blend::Cut,
        TransitionKind::Fade | TransitionKind::Dissolve => Blend::Crossfade,
        TransitionKind::FadeToBlack => Blend::ThroughColor([0, 0, 0, 255]),
        TransitionKind::FadeToWhite => Blend::ThroughColor([255, 255, 255, 255]),
        TransitionKind::SlideLeft => Blend::Slide(Direction::Left),
        TransitionKind::SlideRight => Blend::Slide(Direction::Right),
        TransitionKind::SlideUp => Blend::Slide(Direction::Up),
        TransitionKind::SlideDown => Blend::Slide(Direction::Down),
        TransitionKind::WipeLeft => Blend::Wipe(Direction::Left),
        TransitionKind::WipeRight => Blend::Wipe(Direction::Right),
        TransitionKind::WipeUp => Blend::Wipe(Direction::Up),
        TransitionKind::WipeDown => Blend::Wipe(Direction::Down),
        TransitionKind::Pixelate => {
            let params = if spec.params.is_null() {
                None
            } else {
                Some(spec.params.as_object().ok_or_else(|| {
                    ReelError::validation("pixelate params must be an object")
                })?)
            };
            let max_block = match params.and_then(|p| p.get("maxBlock")) {
                None => DEFAULT_PIXELATE_MAX_BLOCK,
                Some(v) => {
                    let n = v.as_u64().ok_or_else(|| {
                        ReelError::validation("pixelate.maxBlock must be a positive integer")
                    })?;
                    n.clamp(1, 256) as u32
                }
            };
            Blend::Pixelate { max_block }
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
