//! Directory persistence: `manifest.json` plus one file per clip under `images/`.
//!
//! Packing that directory into a portable container is left to the host.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::core::Fps,
    foundation::error::{ReelError, ReelResult},
    timeline::model::{Clip, Timeline},
    timeline::project::{ImageLibrary, Project},
};

/// Manifest file name inside an archive directory.
pub const MANIFEST_FILE: &str = "manifest.json";
/// Image directory inside an archive directory.
pub const IMAGES_DIR: &str = "images";
/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct Manifest {
    version: u32,
    fps: Fps,
    clips: Vec<Clip>,
}

/// Serialize the timeline's manifest document.
pub fn manifest_json(timeline: &Timeline) -> ReelResult<String> {
    let manifest = Manifest {
        version: MANIFEST_VERSION,
        fps: timeline.fps,
        clips: timeline.clips().to_vec(),
    };
    Ok(serde_json::to_string_pretty(&manifest)?)
}

/// Parse a manifest document back into a timeline (duration invariant re-applied).
pub fn timeline_from_manifest(json: &str) -> ReelResult<Timeline> {
    let manifest: Manifest = serde_json::from_str(json)?;
    if manifest.version != MANIFEST_VERSION {
        return Err(ReelError::validation(format!(
            "unsupported manifest version {} (expected {MANIFEST_VERSION})",
            manifest.version
        )));
    }
    let fps = Fps::new(manifest.fps.num, manifest.fps.den)?;
    for clip in &manifest.clips {
        check_file_name(&clip.image)?;
    }
    Timeline::from_clips(fps, manifest.clips)
}

/// Write `project` into `dir` (created if missing).
#[tracing::instrument(skip(project), fields(clips = project.timeline.len()))]
pub fn write_project(project: &Project, dir: &Path) -> ReelResult<()> {
    project.validate()?;
    let images_dir = dir.join(IMAGES_DIR);
    std::fs::create_dir_all(&images_dir)
        .with_context(|| format!("create archive dir '{}'", images_dir.display()))?;

    for clip in project.timeline.clips() {
        check_file_name(&clip.image)?;
        let bytes = project.images.require(&clip.image)?;
        let path = images_dir.join(&clip.image);
        std::fs::write(&path, bytes.as_slice())
            .with_context(|| format!("write image '{}'", path.display()))?;
    }

    let path = dir.join(MANIFEST_FILE);
    std::fs::write(&path, manifest_json(&project.timeline)?)
        .with_context(|| format!("write manifest '{}'", path.display()))?;
    Ok(())
}

/// Read a project previously written by [`write_project`].
#[tracing::instrument]
pub fn read_project(dir: &Path) -> ReelResult<Project> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("read manifest '{}'", manifest_path.display()))?;
    let timeline = timeline_from_manifest(&json)?;

    let mut images = ImageLibrary::new();
    for clip in timeline.clips() {
        if images.get(&clip.image).is_some() {
            continue;
        }
        let path = image_path(dir, &clip.image);
        let bytes = std::fs::read(&path).map_err(|e| {
            ReelError::validation(format!(
                "clip '{}' image '{}' unreadable: {e}",
                clip.id,
                path.display()
            ))
        })?;
        images.insert(clip.image.clone(), bytes);
    }
    Ok(Project { timeline, images })
}

/// Path of an image inside an archive directory.
pub fn image_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(IMAGES_DIR).join(file_name)
}

fn check_file_name(name: &str) -> ReelResult<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if bad {
        return Err(ReelError::validation(format!(
            "image reference '{name}' is not a plain file name"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/archive.rs"]
mod tests;
