//! Engine configuration: defaults, an optional JSON file, then environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Environment variable naming an explicit encoder binary.
pub const ENV_FFMPEG: &str = "STILLREEL_FFMPEG";
/// Environment variable overriding the per-job timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "STILLREEL_TIMEOUT_SECS";
/// Environment variable overriding the temporary working root.
pub const ENV_TMPDIR: &str = "STILLREEL_TMPDIR";

/// Runtime knobs for the export engine and CLI.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Explicit encoder binary. When set, no other location is tried.
    pub ffmpeg_path: Option<PathBuf>,
    /// Extra directories searched for a bundled encoder, after the executable's own directory.
    pub bundled_dirs: Vec<PathBuf>,
    /// Wall-clock budget for one export job.
    pub timeout_secs: f64,
    /// How often a running encoder is polled for exit, timeout and cancellation.
    pub poll_interval_ms: u64,
    /// Maximum bytes of encoder diagnostics kept in errors.
    pub diagnostics_limit: usize,
    /// Parent of per-job working directories (system temp dir when unset).
    pub temp_root: Option<PathBuf>,
    /// Duration given to ingested clips.
    pub default_clip_duration_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            bundled_dirs: Vec::new(),
            timeout_secs: 300.0,
            poll_interval_ms: 50,
            diagnostics_limit: 4096,
            temp_root: None,
            default_clip_duration_ms: crate::timeline::ingest::DEFAULT_CLIP_DURATION_MS,
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> ReelResult<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    /// Apply overrides from `lookup` (normally `std::env::var`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ReelResult<()> {
        if let Some(v) = lookup(ENV_FFMPEG).filter(|v| !v.trim().is_empty()) {
            self.ffmpeg_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = v.trim().parse().map_err(|_| {
                ReelError::validation(format!("{ENV_TIMEOUT_SECS} must be a number, got '{v}'"))
            })?;
        }
        if let Some(v) = lookup(ENV_TMPDIR).filter(|v| !v.trim().is_empty()) {
            self.temp_root = Some(PathBuf::from(v));
        }
        self.validate()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> ReelResult<()> {
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(ReelError::validation("timeoutSecs must be > 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ReelError::validation("pollIntervalMs must be > 0"));
        }
        if self.default_clip_duration_ms == 0 {
            return Err(ReelError::validation("defaultClipDurationMs must be > 0"));
        }
        Ok(())
    }

    /// Job budget as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
