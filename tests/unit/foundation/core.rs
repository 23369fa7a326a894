use super::*;

#[test]
fn fps_rejects_zero_and_excessive_rates() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(240, 1).is_err());
    assert!(Fps::new(30000, 1001).is_ok());
}

#[test]
fn fps_frame_interval_matches_rate() {
    let fps = Fps::integer(25).unwrap();
    assert!((fps.frame_duration_secs() - 0.04).abs() < 1e-12);
    assert!((fps.frame_interval_ms() - 40.0).abs() < 1e-9);
    assert_eq!(fps.to_ffmpeg_rate(), "25");
    assert_eq!(Fps::new(30000, 1001).unwrap().to_ffmpeg_rate(), "30000/1001");
}

#[test]
fn canvas_validation_bounds_edges() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(8000, 10).is_err());
    assert_eq!(Canvas::new(4, 2).unwrap().rgba_len(), 32);
}

#[test]
fn filled_frame_reads_back_pixels() {
    let f = FrameRGBA::filled(Canvas::new(3, 2).unwrap(), [1, 2, 3, 255]);
    assert_eq!(f.pixel(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(f.pixel(3, 0), None);
}
