//! Encoder discovery: explicit override, then a bundled copy, then well-known system paths,
//! then `PATH`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    config::EngineConfig,
    encode::runner::{self, RunOpts},
    foundation::error::{ReelError, ReelResult},
};

#[cfg(windows)]
const BINARY: &str = "ffmpeg.exe";
#[cfg(not(windows))]
const BINARY: &str = "ffmpeg";

/// Locations checked after the bundled directories.
pub const SYSTEM_PATHS: &[&str] = &[
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
];

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where an encoder binary was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderSource {
    /// Config file or `STILLREEL_FFMPEG`.
    Override,
    /// Shipped next to the executable or in a configured bundle directory.
    Bundled,
    /// A well-known installation path.
    System,
    /// Resolved through `PATH`.
    Path,
}

/// A located, invocable encoder.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Encoder {
    /// Binary to spawn.
    pub path: PathBuf,
    /// How it was found.
    pub source: EncoderSource,
    /// First line of `-version` output.
    pub version: String,
}

/// Candidate locations in priority order.
///
/// An explicit override is authoritative: when set, it is the only candidate.
pub fn candidates(cfg: &EngineConfig) -> Vec<(PathBuf, EncoderSource)> {
    if let Some(p) = cfg.ffmpeg_path.as_ref() {
        return vec![(p.clone(), EncoderSource::Override)];
    }
    let mut out = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        out.push((dir.join(BINARY), EncoderSource::Bundled));
    }
    for dir in &cfg.bundled_dirs {
        out.push((dir.join(BINARY), EncoderSource::Bundled));
    }
    for p in SYSTEM_PATHS {
        out.push((PathBuf::from(p), EncoderSource::System));
    }
    out.push((PathBuf::from(BINARY), EncoderSource::Path));
    out
}

/// First candidate that answers `-version`.
#[tracing::instrument(skip(cfg))]
pub fn locate_encoder(cfg: &EngineConfig) -> ReelResult<Encoder> {
    let mut attempted = Vec::new();
    for (path, source) in candidates(cfg) {
        // Bare names are resolved through PATH by the OS; anything else must exist.
        let is_bare = path.components().count() == 1;
        if !is_bare && !path.is_file() {
            attempted.push(format!("{} (not found)", path.display()));
            continue;
        }
        match probe_version(&path) {
            Ok(version) => {
                tracing::debug!(path = %path.display(), ?source, %version, "encoder located");
                return Ok(Encoder {
                    path,
                    source,
                    version,
                });
            }
            Err(e) => attempted.push(format!("{} ({e})", path.display())),
        }
    }
    Err(ReelError::resource(format!(
        "no invocable encoder found; tried: {}",
        attempted.join(", ")
    )))
}

/// Run `path -version` and return its first output line.
pub fn probe_version(path: &Path) -> ReelResult<String> {
    let opts = RunOpts {
        timeout: PROBE_TIMEOUT,
        budget: PROBE_TIMEOUT,
        stderr_limit: 512,
        ..RunOpts::default()
    };
    let out = runner::run(path, &["-version".to_string()], &opts)?;
    let text = String::from_utf8_lossy(&out.stdout);
    let first = text.lines().next().unwrap_or("").trim();
    if first.is_empty() {
        return Err(ReelError::resource(format!(
            "'{} -version' printed nothing",
            path.display()
        )));
    }
    Ok(first.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/locate.rs"]
mod tests;
