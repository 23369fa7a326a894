use std::sync::mpsc::Sender;

/// Phase of an export job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    /// Request checked, encoder located.
    Validated,
    /// Input files staged in the working directory.
    Staged,
    /// An encoder step finished.
    Encoding,
    /// Artifact delivered.
    Done,
}

/// One progress event.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportProgress {
    /// Current phase.
    pub stage: ExportStage,
    /// Completed units within the job.
    pub current: u64,
    /// Total units within the job.
    pub total: u64,
    /// `current / total` in percent.
    pub percentage: f64,
}

impl ExportProgress {
    /// Event with the percentage derived from `current / total`.
    pub fn new(stage: ExportStage, current: u64, total: u64) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            (current.min(total) as f64 / total as f64) * 100.0
        };
        Self {
            stage,
            current,
            total,
            percentage,
        }
    }
}

/// Observer of export progress.
pub trait ProgressSink {
    /// Receive one event. Must not block for long: the job waits for it.
    fn emit(&mut self, event: ExportProgress);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&mut self, _event: ExportProgress) {}
}

/// Collects events in memory.
#[derive(Clone, Debug, Default)]
pub struct ProgressLog {
    events: Vec<ExportProgress>,
}

impl ProgressLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in order.
    pub fn events(&self) -> &[ExportProgress] {
        &self.events
    }
}

impl ProgressSink for ProgressLog {
    fn emit(&mut self, event: ExportProgress) {
        self.events.push(event);
    }
}

impl ProgressSink for Sender<ExportProgress> {
    fn emit(&mut self, event: ExportProgress) {
        // A dropped receiver means nobody is watching.
        let _ = self.send(event);
    }
}
