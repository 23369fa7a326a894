use super::*;
use crate::foundation::core::Fps;
use crate::test_support::{color_project, png_bytes};
use crate::timeline::model::Clip;

#[test]
fn identical_bytes_share_one_decode() {
    let mut project = color_project(Fps::default(), &[([1, 2, 3, 255], 500), ([9, 9, 9, 255], 500)]);
    project
        .images
        .insert("dup.png", png_bytes(4, 4, [1, 2, 3, 255]));
    project
        .timeline
        .push(Clip::new("c2", "dup.png", 4, 4, 500))
        .unwrap();

    let cache = ImageCache::prepare(&project).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.key_of("c0.png"), cache.key_of("dup.png"));
    assert_ne!(cache.key_of("c0.png"), cache.key_of("c1.png"));
    assert_eq!(cache.get("c1.png").unwrap().px(0, 0), [9, 9, 9, 255]);
}

#[test]
fn undecodable_image_names_the_clip() {
    let mut project = color_project(Fps::default(), &[([1, 2, 3, 255], 500)]);
    project.images.insert("c0.png", b"not an image".to_vec());
    let err = ImageCache::prepare(&project).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert!(err.to_string().contains("c0"));
}

#[test]
fn missing_library_entry_is_rejected() {
    let mut project = color_project(Fps::default(), &[([1, 2, 3, 255], 500)]);
    project.images = Default::default();
    assert!(ImageCache::prepare(&project).is_err());
}

#[test]
fn key_is_stable_for_same_bytes() {
    assert_eq!(ImageKey::of(b"abc"), ImageKey::of(b"abc"));
    assert_ne!(ImageKey::of(b"abc"), ImageKey::of(b"abd"));
}

#[test]
fn colliding_keys_never_share_a_decode() {
    let red = std::sync::Arc::new(png_bytes(2, 2, [255, 0, 0, 255]));
    let blue = std::sync::Arc::new(png_bytes(2, 2, [0, 0, 255, 255]));
    let mut cache = ImageCache::default();

    let a = cache.intern(ImageKey(7), &red).unwrap();
    let b = cache.intern(ImageKey(7), &blue).unwrap();
    assert_eq!(a, ImageKey(7));
    assert_ne!(a, b);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.images[&a].px(0, 0), [255, 0, 0, 255]);
    assert_eq!(cache.images[&b].px(0, 0), [0, 0, 255, 255]);

    // Same bytes under the same hash resolve to the original entry.
    assert_eq!(cache.intern(ImageKey(7), &red).unwrap(), a);
    assert_eq!(cache.len(), 2);
}
