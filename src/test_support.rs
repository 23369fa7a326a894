use std::io::Cursor;

use crate::{
    foundation::core::Fps,
    timeline::model::{Clip, Timeline},
    timeline::project::{ImageLibrary, Project},
};

pub(crate) fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// One 4x4 solid-color clip per `(color, duration_ms)`, ids `c0`, `c1`, ...
pub(crate) fn color_project(fps: Fps, clips: &[([u8; 4], u64)]) -> Project {
    let mut timeline = Timeline::new(fps);
    let mut images = ImageLibrary::new();
    for (i, (color, ms)) in clips.iter().enumerate() {
        let name = format!("c{i}.png");
        images.insert(name.clone(), png_bytes(4, 4, *color));
        timeline
            .push(Clip::new(format!("c{i}"), name, 4, 4, *ms))
            .unwrap();
    }
    Project { timeline, images }
}

/// Write an executable `/bin/sh` script standing in for the encoder.
#[cfg(unix)]
pub(crate) fn fake_encoder(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt as _;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
