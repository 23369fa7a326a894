//! Pure CPU blend kernels over premultiplied RGBA8 frames.
//!
//! Every image is aspect-fit (letterboxed, centered) into the output box before blending.

use crate::{
    assets::PreparedImage,
    effects::transitions::{Blend, Direction},
    foundation::core::FrameRGBA,
    foundation::math::{clamp01, mul_div255_u8},
};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Opaque black, the compositor's background.
pub const BLACK: PremulRgba8 = [0, 0, 0, 255];

/// Source-over with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Placement of an aspect-fit image inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitRect {
    /// Left edge in canvas pixels.
    pub x: i64,
    /// Top edge in canvas pixels.
    pub y: i64,
    /// Fitted width.
    pub w: u32,
    /// Fitted height.
    pub h: u32,
}

/// Largest centered rectangle with the image's aspect ratio that fits the canvas.
pub fn fit_rect(img_w: u32, img_h: u32, canvas_w: u32, canvas_h: u32) -> FitRect {
    if img_w == 0 || img_h == 0 || canvas_w == 0 || canvas_h == 0 {
        return FitRect {
            x: 0,
            y: 0,
            w: 0,
            h: 0,
        };
    }
    let scale = (f64::from(canvas_w) / f64::from(img_w)).min(f64::from(canvas_h) / f64::from(img_h));
    let w = ((f64::from(img_w) * scale).round() as u32).clamp(1, canvas_w);
    let h = ((f64::from(img_h) * scale).round() as u32).clamp(1, canvas_h);
    FitRect {
        x: i64::from((canvas_w - w) / 2),
        y: i64::from((canvas_h - h) / 2),
        w,
        h,
    }
}

/// Half-open clip rectangle `[x0, x1) x [y0, y1)` in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipRect {
    /// Inclusive left.
    pub x0: u32,
    /// Inclusive top.
    pub y0: u32,
    /// Exclusive right.
    pub x1: u32,
    /// Exclusive bottom.
    pub y1: u32,
}

/// How one image is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Horizontal translation in pixels.
    pub dx: i64,
    /// Vertical translation in pixels.
    pub dy: i64,
    /// Opacity multiplier.
    pub opacity: f32,
    /// Optional clip.
    pub clip: Option<ClipRect>,
    /// Pixelation block edge; `1` draws at full detail.
    pub block: u32,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            dx: 0,
            dy: 0,
            opacity: 1.0,
            clip: None,
            block: 1,
        }
    }
}

/// Composite `img` (aspect-fit, then transformed by `params`) over `dst`.
///
/// Sampling is nearest-neighbour; `block > 1` snaps samples to the block grid, which is the same
/// as downsampling by `block` and upsampling with nearest.
pub fn draw_fit(dst: &mut FrameRGBA, img: &PreparedImage, params: DrawParams) {
    let fit = fit_rect(img.width, img.height, dst.width, dst.height);
    if fit.w == 0 || fit.h == 0 || params.opacity <= 0.0 {
        return;
    }
    let tx = fit.x + params.dx;
    let ty = fit.y + params.dy;

    let clip = params.clip.unwrap_or(ClipRect {
        x0: 0,
        y0: 0,
        x1: dst.width,
        y1: dst.height,
    });
    let x_start = tx.max(i64::from(clip.x0)).max(0);
    let x_end = (tx + i64::from(fit.w))
        .min(i64::from(clip.x1))
        .min(i64::from(dst.width));
    let y_start = ty.max(i64::from(clip.y0)).max(0);
    let y_end = (ty + i64::from(fit.h))
        .min(i64::from(clip.y1))
        .min(i64::from(dst.height));
    if x_start >= x_end || y_start >= y_end {
        return;
    }

    let block = u64::from(params.block.max(1));
    let snap = |local: u64, len: u32| -> u64 {
        if block == 1 {
            local
        } else {
            ((local / block) * block + block / 2).min(u64::from(len) - 1)
        }
    };

    let row_stride = dst.width as usize * 4;
    for y in y_start..y_end {
        let ly = snap((y - ty) as u64, fit.h);
        let sy = ((ly * u64::from(img.height)) / u64::from(fit.h)).min(u64::from(img.height) - 1);
        for x in x_start..x_end {
            let lx = snap((x - tx) as u64, fit.w);
            let sx = ((lx * u64::from(img.width)) / u64::from(fit.w)).min(u64::from(img.width) - 1);
            let src = img.px(sx as u32, sy as u32);
            let idx = (y as usize) * row_stride + (x as usize) * 4;
            let d = [
                dst.data[idx],
                dst.data[idx + 1],
                dst.data[idx + 2],
                dst.data[idx + 3],
            ];
            dst.data[idx..idx + 4].copy_from_slice(&over(d, src, params.opacity));
        }
    }
}

/// Composite a flat color over the whole frame.
pub fn fill(dst: &mut FrameRGBA, color: PremulRgba8, opacity: f32) {
    for px in dst.data.chunks_exact_mut(4) {
        let out = over([px[0], px[1], px[2], px[3]], color, opacity);
        px.copy_from_slice(&out);
    }
}

/// Draw one clip alone over the black background.
pub fn compose_solo(dst: &mut FrameRGBA, img: &PreparedImage) {
    fill(dst, BLACK, 1.0);
    draw_fit(dst, img, DrawParams::default());
}

/// Draw the blend of `from` into `to` at progress `p` over the black background.
pub fn compose_transition(
    dst: &mut FrameRGBA,
    from: &PreparedImage,
    to: &PreparedImage,
    blend: Blend,
    p: f64,
) {
    let p = clamp01(p);
    let pf = p as f32;
    fill(dst, BLACK, 1.0);

    match blend {
        Blend::Cut => draw_fit(dst, from, DrawParams::default()),
        Blend::Crossfade => {
            draw_fit(dst, from, with_opacity(1.0 - pf));
            draw_fit(dst, to, with_opacity(pf));
        }
        Blend::ThroughColor(straight) => {
            let color = premul(straight);
            if p < 0.5 {
                let q = (2.0 * p) as f32;
                draw_fit(dst, from, with_opacity(1.0 - q));
                fill(dst, color, q);
            } else {
                let q = (2.0 * p - 1.0) as f32;
                fill(dst, color, 1.0 - q);
                draw_fit(dst, to, with_opacity(q));
            }
        }
        Blend::Slide(dir) => {
            let (w, h) = (f64::from(dst.width), f64::from(dst.height));
            let (out_dx, out_dy, in_dx, in_dy) = match dir {
                Direction::Left => (-(p * w), 0.0, (1.0 - p) * w, 0.0),
                Direction::Right => (p * w, 0.0, -((1.0 - p) * w), 0.0),
                Direction::Up => (0.0, -(p * h), 0.0, (1.0 - p) * h),
                Direction::Down => (0.0, p * h, 0.0, -((1.0 - p) * h)),
            };
            draw_fit(dst, from, translated(out_dx, out_dy));
            draw_fit(dst, to, translated(in_dx, in_dy));
        }
        Blend::Wipe(dir) => {
            draw_fit(dst, from, DrawParams::default());
            let clip = wipe_rect(dir, p, dst.width, dst.height);
            draw_fit(
                dst,
                to,
                DrawParams {
                    clip: Some(clip),
                    ..DrawParams::default()
                },
            );
        }
        Blend::Pixelate { max_block } => {
            draw_fit(
                dst,
                from,
                DrawParams {
                    opacity: 1.0 - pf,
                    block: pixel_block(max_block, p),
                    ..DrawParams::default()
                },
            );
            draw_fit(
                dst,
                to,
                DrawParams {
                    opacity: pf,
                    block: pixel_block(max_block, 1.0 - p),
                    ..DrawParams::default()
                },
            );
        }
    }
}

/// Region of the incoming image revealed by a wipe at progress `p`.
///
/// The revealed edge travels in `dir`: `Left` grows from the right edge toward the left.
pub fn wipe_rect(dir: Direction, p: f64, width: u32, height: u32) -> ClipRect {
    let p = clamp01(p);
    let along = |len: u32| ((f64::from(len) * p).round() as u32).min(len);
    match dir {
        Direction::Left => ClipRect {
            x0: width - along(width),
            y0: 0,
            x1: width,
            y1: height,
        },
        Direction::Right => ClipRect {
            x0: 0,
            y0: 0,
            x1: along(width),
            y1: height,
        },
        Direction::Up => ClipRect {
            x0: 0,
            y0: height - along(height),
            x1: width,
            y1: height,
        },
        Direction::Down => ClipRect {
            x0: 0,
            y0: 0,
            x1: width,
            y1: along(height),
        },
    }
}

/// Block edge for pixelation amount `t` in `[0, 1]`: `1` at 0, `max_block` at 1.
pub fn pixel_block(max_block: u32, t: f64) -> u32 {
    let max_block = max_block.max(1);
    1 + ((f64::from(max_block - 1)) * clamp01(t)).round() as u32
}

fn with_opacity(opacity: f32) -> DrawParams {
    DrawParams {
        opacity,
        ..DrawParams::default()
    }
}

fn translated(dx: f64, dy: f64) -> DrawParams {
    DrawParams {
        dx: dx.round() as i64,
        dy: dy.round() as i64,
        ..DrawParams::default()
    }
}

fn premul(c: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(c[3]);
    [
        mul_div255(u16::from(c[0]), a),
        mul_div255(u16::from(c[1]), a),
        mul_div255(u16::from(c[2]), a),
        c[3],
    ]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/kernels.rs"]
mod tests;
