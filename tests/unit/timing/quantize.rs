use super::*;

fn fps(n: u32) -> Fps {
    Fps::integer(n).unwrap()
}

#[test]
fn quantize_modes_pick_expected_multiples() {
    let step = 0.1;
    assert!((quantize(0.26, step, QuantizeMode::Round) - 0.3).abs() < 1e-12);
    assert!((quantize(0.26, step, QuantizeMode::Floor) - 0.2).abs() < 1e-12);
    assert!((quantize(0.21, step, QuantizeMode::Ceil) - 0.3).abs() < 1e-12);
}

#[test]
fn ceil_does_not_jitter_on_exact_multiples() {
    let step = 1.0 / 30.0;
    let q = quantize(0.4, step, QuantizeMode::Ceil);
    assert!((q - 0.4).abs() < 1e-12);
    assert_eq!(ms_to_frames(400, fps(30), QuantizeMode::Ceil), 12);
}

#[test]
fn round_quantization_is_idempotent() {
    for step in [1.0 / 24.0, 1.0 / 30.0, 1001.0 / 30000.0, 1.0 / 60.0, 0.125] {
        let mut x = 0.001;
        while x < 120.0 {
            let once = quantize(x, step, QuantizeMode::Round);
            let twice = quantize(once, step, QuantizeMode::Round);
            assert_eq!(once, twice, "x={x} step={step}");
            x += 0.737;
        }
    }
}

#[test]
fn ms_to_frames_requantizes_per_rate() {
    assert_eq!(ms_to_frames(400, fps(30), QuantizeMode::Round), 12);
    // 400ms at 24fps is 9.6 frames.
    assert_eq!(ms_to_frames(400, fps(24), QuantizeMode::Round), 10);
    assert_eq!(ms_to_frames(400, fps(24), QuantizeMode::Floor), 9);
    assert_eq!(ms_to_frames(0, fps(24), QuantizeMode::Ceil), 0);
    let ntsc = Fps::new(30000, 1001).unwrap();
    assert_eq!(ms_to_frames(1001, ntsc, QuantizeMode::Round), 30);
}

#[test]
fn min_gap_spans_one_frame() {
    assert_eq!(min_frame_gap_ms(fps(30)), 34);
    assert_eq!(min_frame_gap_ms(fps(25)), 40);
    assert_eq!(min_frame_gap_ms(fps(24)), 42);
}

#[test]
fn secs_formatting_trims_zeros() {
    assert_eq!(format_secs(0.4), "0.4");
    assert_eq!(format_secs(2.0), "2");
    assert_eq!(format_secs(0.0), "0");
    assert_eq!(frames_to_secs_arg(12, fps(30)), "0.4");
}

#[test]
fn padded_input_adds_one_frame() {
    assert_eq!(padded_input_secs(30, fps(30)), "1.033333");
    assert_eq!(padded_input_secs(24, fps(24)), "1.041667");
}
