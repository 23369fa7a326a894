use std::sync::Arc;

use super::*;
use crate::foundation::core::Canvas;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(w: u32, h: u32, c: [u8; 4]) -> PreparedImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _ in 0..w * h {
        data.extend_from_slice(&c);
    }
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(data),
    }
}

fn frame(w: u32, h: u32) -> FrameRGBA {
    FrameRGBA::filled(Canvas::new(w, h).unwrap(), [0, 0, 0, 0])
}

#[test]
fn over_respects_opacity_extremes() {
    assert_eq!(over(BLACK, RED, 0.0), BLACK);
    assert_eq!(over(BLACK, RED, 1.0), RED);
    assert_eq!(over(RED, [0, 0, 0, 0], 1.0), RED);
}

#[test]
fn fit_rect_letterboxes_wide_images() {
    assert_eq!(
        fit_rect(4, 2, 8, 8),
        FitRect {
            x: 0,
            y: 2,
            w: 8,
            h: 4
        }
    );
    assert_eq!(
        fit_rect(2, 4, 8, 4),
        FitRect {
            x: 3,
            y: 0,
            w: 2,
            h: 4
        }
    );
    assert_eq!(fit_rect(0, 4, 8, 4).w, 0);
}

#[test]
fn solo_draws_image_inside_black_bars() {
    let mut f = frame(8, 8);
    compose_solo(&mut f, &solid(4, 2, RED));
    assert_eq!(f.pixel(0, 0), Some(BLACK));
    assert_eq!(f.pixel(4, 4), Some(RED));
    assert_eq!(f.pixel(7, 7), Some(BLACK));
}

#[test]
fn crossfade_endpoints_show_single_image() {
    let (a, b) = (solid(4, 4, RED), solid(4, 4, BLUE));
    let mut f = frame(4, 4);
    compose_transition(&mut f, &a, &b, Blend::Crossfade, 0.0);
    assert_eq!(f.pixel(1, 1), Some(RED));
    compose_transition(&mut f, &a, &b, Blend::Crossfade, 1.0);
    assert_eq!(f.pixel(1, 1), Some(BLUE));

    compose_transition(&mut f, &a, &b, Blend::Crossfade, 0.5);
    let px = f.pixel(1, 1).unwrap();
    assert!(px[0] > 0 && px[2] > 0);
}

#[test]
fn fade_through_black_hits_black_midpoint() {
    let (a, b) = (solid(4, 4, RED), solid(4, 4, BLUE));
    let mut f = frame(4, 4);
    compose_transition(&mut f, &a, &b, Blend::ThroughColor([0, 0, 0, 255]), 0.5);
    assert_eq!(f.pixel(2, 2), Some(BLACK));

    compose_transition(
        &mut f,
        &a,
        &b,
        Blend::ThroughColor([255, 255, 255, 255]),
        0.5,
    );
    assert_eq!(f.pixel(2, 2), Some([255, 255, 255, 255]));
}

#[test]
fn slide_left_pushes_outgoing_off_the_left_edge() {
    let (a, b) = (solid(4, 2, RED), solid(4, 2, BLUE));
    let mut f = frame(4, 2);
    compose_transition(&mut f, &a, &b, Blend::Slide(Direction::Left), 0.5);
    assert_eq!(f.pixel(0, 0), Some(RED));
    assert_eq!(f.pixel(1, 1), Some(RED));
    assert_eq!(f.pixel(2, 0), Some(BLUE));
    assert_eq!(f.pixel(3, 1), Some(BLUE));
}

#[test]
fn slide_down_brings_incoming_from_the_top() {
    let (a, b) = (solid(2, 4, RED), solid(2, 4, BLUE));
    let mut f = frame(2, 4);
    compose_transition(&mut f, &a, &b, Blend::Slide(Direction::Down), 0.25);
    assert_eq!(f.pixel(0, 0), Some(BLUE));
    assert_eq!(f.pixel(0, 1), Some(RED));
    assert_eq!(f.pixel(0, 3), Some(RED));
}

#[test]
fn wipe_left_reveals_from_the_right_edge() {
    let (a, b) = (solid(4, 2, RED), solid(4, 2, BLUE));
    let mut f = frame(4, 2);
    compose_transition(&mut f, &a, &b, Blend::Wipe(Direction::Left), 0.5);
    assert_eq!(f.pixel(0, 0), Some(RED));
    assert_eq!(f.pixel(1, 0), Some(RED));
    assert_eq!(f.pixel(2, 0), Some(BLUE));
    assert_eq!(f.pixel(3, 1), Some(BLUE));
}

#[test]
fn wipe_rect_covers_progress_fraction() {
    assert_eq!(
        wipe_rect(Direction::Down, 0.25, 8, 8),
        ClipRect {
            x0: 0,
            y0: 0,
            x1: 8,
            y1: 2
        }
    );
    assert_eq!(wipe_rect(Direction::Up, 1.0, 8, 8).y0, 0);
    assert_eq!(wipe_rect(Direction::Right, 0.0, 8, 8).x1, 0);
}

#[test]
fn pixel_block_ramps_between_one_and_max() {
    assert_eq!(pixel_block(32, 0.0), 1);
    assert_eq!(pixel_block(32, 1.0), 32);
    assert_eq!(pixel_block(0, 0.7), 1);
    assert!(pixel_block(32, 0.5) > 1 && pixel_block(32, 0.5) < 32);
}

#[test]
fn pixelate_at_zero_keeps_full_detail() {
    let mut data = Vec::new();
    for i in 0..16 {
        data.extend_from_slice(if i % 2 == 0 { &RED } else { &BLUE });
    }
    let checker = PreparedImage {
        width: 4,
        height: 4,
        rgba8_premul: Arc::new(data),
    };
    let mut f = frame(4, 4);
    compose_transition(
        &mut f,
        &checker,
        &solid(4, 4, BLUE),
        Blend::Pixelate { max_block: 4 },
        0.0,
    );
    assert_eq!(f.pixel(0, 0), Some(RED));
    assert_eq!(f.pixel(1, 0), Some(BLUE));

    // Fully blocky outgoing image samples one texel per 4x4 block.
    let mut g = frame(4, 4);
    draw_fit(
        &mut g,
        &checker,
        DrawParams {
            block: 4,
            ..DrawParams::default()
        },
    );
    assert_eq!(g.pixel(0, 0), g.pixel(1, 0));
    assert_eq!(g.pixel(0, 0), g.pixel(3, 3));
}
