//! Spawn and supervise one encoder process.
//!
//! stdout is captured as the result bytes, stderr as diagnostics. Both pipes are drained on
//! helper threads so a chatty encoder never blocks on a full pipe while it is being polled.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::error::{ReelError, ReelResult};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Return `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Supervision limits for one process.
#[derive(Clone, Debug)]
pub struct RunOpts {
    /// Kill the process after this long.
    pub timeout: Duration,
    /// Reported as the exceeded budget on timeout (the job budget, not the step's share).
    pub budget: Duration,
    /// Exit/timeout/cancel polling period.
    pub poll_interval: Duration,
    /// Bytes of stderr tail kept in errors.
    pub stderr_limit: usize,
    /// Optional cancellation flag.
    pub cancel: Option<CancelToken>,
    /// Working directory of the child.
    pub cwd: Option<PathBuf>,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            budget: Duration::from_secs(300),
            poll_interval: Duration::from_millis(50),
            stderr_limit: 4096,
            cancel: None,
            cwd: None,
        }
    }
}

/// Output of a successful run.
#[derive(Clone, Debug, Default)]
pub struct RunOutput {
    /// Everything the process wrote to stdout.
    pub stdout: Vec<u8>,
    /// Truncated stderr tail.
    pub stderr: String,
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Run `program args...` to completion under `opts`.
#[tracing::instrument(skip(args, opts), fields(args = args.len()))]
pub fn run(program: &Path, args: &[String], opts: &RunOpts) -> ReelResult<RunOutput> {
    tracing::debug!(?args, "spawning encoder");
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = opts.cwd.as_deref() {
        cmd.current_dir(cwd);
    }
    let mut child = cmd.spawn().map_err(|e| {
        ReelError::resource(format!(
            "failed to spawn encoder '{}': {e}",
            program.display()
        ))
    })?;

    let stdout_drain = drain(child.stdout.take());
    let stderr_drain = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(ReelError::io(format!(
                    "failed to poll encoder '{}': {e}",
                    program.display()
                )));
            }
        }
        if opts.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            kill_and_reap(&mut child);
            tracing::warn!(program = %program.display(), "encoder cancelled");
            return Err(ReelError::Cancelled);
        }
        let elapsed = started.elapsed();
        if elapsed >= opts.timeout {
            kill_and_reap(&mut child);
            tracing::warn!(
                program = %program.display(),
                budget_secs = opts.budget.as_secs_f64(),
                "encoder exceeded its time budget, killed"
            );
            return Err(ReelError::Timeout {
                secs: opts.budget.as_secs_f64(),
            });
        }
        std::thread::sleep(opts.poll_interval.min(opts.timeout - elapsed));
    };

    let stdout = join(stdout_drain, "stdout")?;
    let stderr_bytes = join(stderr_drain, "stderr")?;
    let stderr = truncate_tail(&String::from_utf8_lossy(&stderr_bytes), opts.stderr_limit);

    if !status.success() {
        return Err(ReelError::Process {
            code: status.code(),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(RunOutput { stdout, stderr })
}

/// Keep at most the last `limit` bytes of `s` (on a char boundary), marking the cut.
pub fn truncate_tail(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        return s.to_string();
    }
    let mut start = s.len() - limit;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    format!("[...] {}", &s[start..])
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Drain> {
    pipe.map(|mut r| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            r.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join(handle: Option<Drain>, what: &str) -> ReelResult<Vec<u8>> {
    match handle {
        Some(h) => h
            .join()
            .map_err(|_| ReelError::io(format!("encoder {what} drain thread panicked")))?
            .map_err(|e| ReelError::io(format!("encoder {what} read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

// Drain threads are left detached: they finish once the killed process's pipes close.
fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::warn!(error = %e, "failed to kill encoder");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "failed to reap encoder");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/runner.rs"]
mod tests;
