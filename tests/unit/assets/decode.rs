use super::*;
use crate::test_support::png_bytes;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(2, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 2);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        &prepared.rgba8_premul[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
    assert_eq!(prepared.px(1, 0), prepared.px(0, 0));
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"definitely not a png").is_err());
}

#[test]
fn fully_transparent_pixels_zero_their_color() {
    let prepared = decode_image(&png_bytes(1, 1, [90, 80, 70, 0])).unwrap();
    assert_eq!(prepared.rgba8_premul.as_slice(), &[0, 0, 0, 0]);
}
