//! The export job boundary: every failure below is mapped to one structured result.

use std::time::Instant;

use crate::{
    config::EngineConfig,
    effects::transitions::TransitionKind,
    encode::locate::{Encoder, locate_encoder},
    encode::runner::{self, CancelToken, RunOpts, truncate_tail},
    encode::workdir::WorkDir,
    export::plan::{ExportPlan, StepOutput},
    export::progress::{ExportProgress, ExportStage, ProgressSink},
    export::request::{ExportRequest, OutputFormat, Strategy, StrategySelector},
    foundation::error::{ErrorKind, ReelError, ReelResult},
};

/// A delivered export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportArtifact {
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub content_type: &'static str,
    /// Delivered format.
    pub format: OutputFormat,
    /// Strategy that produced it.
    pub strategy: Strategy,
    /// Output length in frames.
    pub frames: u64,
    /// Output length in seconds.
    pub duration_secs: f64,
}

/// Structured failure returned across the job boundary.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportFailure {
    /// Error class.
    pub kind: ErrorKind,
    /// Encoder exit code for [`ErrorKind::Process`] failures; `None` when killed by a signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Human-readable message. Encoder diagnostics are cut to the configured limit, keeping
    /// their tail; the exit status prefix is always kept.
    pub message: String,
}

impl ExportFailure {
    /// Map an engine error, keeping at most `limit` bytes of its diagnostic tail.
    pub fn from_error(err: &ReelError, limit: usize) -> Self {
        match err {
            ReelError::Process { code, stderr } => Self {
                kind: ErrorKind::Process,
                code: *code,
                message: format!(
                    "encoder exited with status {code:?}: {}",
                    truncate_tail(stderr, limit)
                ),
            },
            other => Self {
                kind: other.kind(),
                code: None,
                message: truncate_tail(&other.to_string(), limit),
            },
        }
    }
}

impl std::fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ExportFailure {}

/// What this engine can do, answered without running an export.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Capabilities {
    /// Located encoder.
    pub encoder: Encoder,
    /// Deliverable formats.
    pub formats: Vec<OutputFormat>,
    /// Accepted strategy selectors.
    pub strategies: Vec<StrategySelector>,
    /// Supported transition kinds.
    pub transitions: Vec<TransitionKind>,
}

/// Cheap liveness probe: locates the encoder and runs only `-version`.
pub fn capabilities(cfg: &EngineConfig) -> ReelResult<Capabilities> {
    Ok(Capabilities {
        encoder: locate_encoder(cfg)?,
        formats: OutputFormat::ALL.to_vec(),
        strategies: StrategySelector::ALL.to_vec(),
        transitions: TransitionKind::ALL.to_vec(),
    })
}

/// Runs export jobs. Jobs share no state and may run concurrently.
#[derive(Clone, Debug, Default)]
pub struct Exporter {
    config: EngineConfig,
}

impl Exporter {
    /// Exporter using `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one job to completion.
    ///
    /// Validation failures return before any process is spawned. The working directory is
    /// removed on every path.
    pub fn export(
        &self,
        req: &ExportRequest,
        progress: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> Result<ExportArtifact, ExportFailure> {
        self.run(req, progress, cancel).map_err(|e| {
            let failure = ExportFailure::from_error(&e, self.config.diagnostics_limit);
            tracing::warn!(kind = ?failure.kind, message = %failure.message, "export failed");
            failure
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(clips = req.project.timeline.len(), format = ?req.format, strategy = ?req.strategy)
    )]
    fn run(
        &self,
        req: &ExportRequest,
        progress: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> ReelResult<ExportArtifact> {
        let started = Instant::now();
        let strategy = req.validate()?;
        let encoder = locate_encoder(&self.config)?;

        let work = WorkDir::new(self.config.temp_root.as_deref())?;
        let result = self.run_in(&work, req, strategy, &encoder, progress, cancel, started);
        work.finish();

        if let Ok(artifact) = &result {
            tracing::info!(
                ?strategy,
                bytes = artifact.bytes.len(),
                frames = artifact.frames,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "export finished"
            );
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn run_in(
        &self,
        work: &WorkDir,
        req: &ExportRequest,
        strategy: Strategy,
        encoder: &Encoder,
        progress: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
        started: Instant,
    ) -> ReelResult<ExportArtifact> {
        let plan = ExportPlan::build(req, strategy, work.path())?;
        let total = plan.steps.len() as u64 + 1;
        progress.emit(ExportProgress::new(ExportStage::Validated, 0, total));

        for file in &plan.files {
            work.write(&file.path, file.contents.as_slice())?;
        }
        progress.emit(ExportProgress::new(ExportStage::Staged, 1, total));

        let budget = self.config.timeout();
        let mut delivered = None;
        for (i, step) in plan.steps.iter().enumerate() {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(ReelError::Cancelled);
            }
            let remaining = budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                tracing::warn!(step = %step.label, "export budget exhausted before step");
                return Err(ReelError::Timeout {
                    secs: budget.as_secs_f64(),
                });
            }
            let opts = RunOpts {
                timeout: remaining,
                budget,
                poll_interval: self.config.poll_interval(),
                stderr_limit: self.config.diagnostics_limit,
                cancel: cancel.cloned(),
                cwd: Some(work.path().to_path_buf()),
            };

            tracing::debug!(step = %step.label, "running encoder step");
            let out = runner::run(&encoder.path, &step.args, &opts)?;
            match &step.output {
                StepOutput::Stdout => delivered = Some(out.stdout),
                StepOutput::File(path) if !path.is_file() => {
                    return Err(ReelError::Process {
                        code: Some(0),
                        stderr: format!(
                            "step '{}' did not produce '{}'",
                            step.label,
                            path.display()
                        ),
                    });
                }
                StepOutput::File(_) => {}
            }
            for path in &step.discard_after {
                work.discard(path);
            }
            progress.emit(ExportProgress::new(
                ExportStage::Encoding,
                i as u64 + 2,
                total,
            ));
        }

        let bytes = delivered
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ReelError::Process {
                code: Some(0),
                stderr: "encoder produced no output".to_string(),
            })?;
        progress.emit(ExportProgress::new(ExportStage::Done, total, total));

        Ok(ExportArtifact {
            bytes,
            content_type: plan.format.content_type(),
            format: plan.format,
            strategy: plan.strategy,
            frames: plan.total_frames(),
            duration_secs: plan.duration_secs(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/job.rs"]
mod tests;
