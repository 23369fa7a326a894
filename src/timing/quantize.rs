//! Frame quantization shared by the preview compositor and every export strategy.
//!
//! All export durations are derived here. Call sites pick a mode explicitly:
//! clip boundaries and transition lengths use [`QuantizeMode::Round`], safety margins that need a
//! guaranteed minimum use [`QuantizeMode::Ceil`].

use crate::foundation::core::Fps;

/// Rounding mode applied to `value / step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantizeMode {
    /// Nearest multiple (ties away from zero).
    Round,
    /// Largest multiple not above `value`.
    Floor,
    /// Smallest multiple not below `value`.
    Ceil,
}

// Ratios within this distance of an integer are treated as that integer, so `0.4 / (1/30)`
// does not ceil to 13.
const SNAP_EPS: f64 = 1e-9;

fn apply(ratio: f64, mode: QuantizeMode) -> f64 {
    let nearest = ratio.round();
    if (ratio - nearest).abs() < SNAP_EPS {
        return nearest;
    }
    match mode {
        QuantizeMode::Round => nearest,
        QuantizeMode::Floor => ratio.floor(),
        QuantizeMode::Ceil => ratio.ceil(),
    }
}

/// `mode(value / step_sec) * step_sec`.
///
/// Non-finite or non-positive steps return `value` unchanged.
pub fn quantize(value: f64, step_sec: f64, mode: QuantizeMode) -> f64 {
    if !step_sec.is_finite() || step_sec <= 0.0 || !value.is_finite() {
        return value;
    }
    apply(value / step_sec, mode) * step_sec
}

/// Number of whole frames at `fps` covering `secs`, under `mode`.
pub fn secs_to_frames(secs: f64, fps: Fps, mode: QuantizeMode) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    // `secs * num / den` keeps rational rates exact where `secs / step` would not.
    let ratio = secs * f64::from(fps.num) / f64::from(fps.den);
    apply(ratio, mode).max(0.0) as u64
}

/// Number of whole frames at `fps` covering `ms`, under `mode`.
pub fn ms_to_frames(ms: u64, fps: Fps, mode: QuantizeMode) -> u64 {
    secs_to_frames(ms as f64 / 1000.0, fps, mode)
}

/// Seconds for `frames` at `fps`, formatted for encoder arguments.
pub fn frames_to_secs_arg(frames: u64, fps: Fps) -> String {
    format_secs(fps.frames_to_secs(frames))
}

/// Encoder-facing decimal seconds (microsecond resolution, trailing zeros trimmed).
pub fn format_secs(secs: f64) -> String {
    let s = format!("{secs:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Smallest whole-millisecond gap that spans at least one frame interval at `fps`.
pub fn min_frame_gap_ms(fps: Fps) -> u64 {
    // Ceil: the gap is a guaranteed minimum.
    let num = u64::from(fps.num.max(1));
    let den = u64::from(fps.den.max(1));
    (1000 * den).div_ceil(num)
}

/// Safety-padded length for looped still inputs: one extra frame, ceil-quantized.
pub fn padded_input_secs(frames: u64, fps: Fps) -> String {
    let step = fps.frame_duration_secs();
    let padded = quantize(fps.frames_to_secs(frames) + step, step, QuantizeMode::Ceil);
    format_secs(padded)
}

#[cfg(test)]
#[path = "../../tests/unit/timing/quantize.rs"]
mod tests;
