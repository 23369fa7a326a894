/// Convenience result type used across stillreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by timeline, preview and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Malformed or unsupported caller input. Raised before any encoder process is spawned.
    #[error("validation error: {0}")]
    Validation(String),

    /// The encoder binary is missing or cannot be invoked.
    #[error("resource error: {0}")]
    Resource(String),

    /// The encoder exited with a non-zero status.
    #[error("encoder exited with status {code:?}: {stderr}")]
    Process {
        /// Exit code, `None` when the process was terminated by a signal.
        code: Option<i32>,
        /// Captured (possibly truncated) diagnostic output.
        stderr: String,
    },

    /// The encoder exceeded its wall-clock budget and was killed.
    #[error("encoder timed out after {secs:.1}s")]
    Timeout {
        /// Budget that was exceeded, in seconds.
        secs: f64,
    },

    /// The job was cancelled by its caller.
    #[error("export cancelled")]
    Cancelled,

    /// IO failure while writing required job artifacts.
    #[error("io error: {0}")]
    Io(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`ReelError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Coarse classification used in structured job results.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Serde(_) => ErrorKind::Validation,
            Self::Resource(_) => ErrorKind::Resource,
            Self::Process { .. } => ErrorKind::Process,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io(_) | Self::Other(_) => ErrorKind::Io,
        }
    }

    /// Whether the caller can fix the failure by changing the request.
    pub fn is_caller_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::Process | ErrorKind::Cancelled
        )
    }
}

/// Serializable error class carried in [`crate::ExportFailure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ReelError::Validation`].
    Validation,
    /// See [`ReelError::Resource`].
    Resource,
    /// See [`ReelError::Process`].
    Process,
    /// See [`ReelError::Timeout`].
    Timeout,
    /// See [`ReelError::Cancelled`].
    Cancelled,
    /// See [`ReelError::Io`].
    Io,
}

impl From<std::io::Error> for ReelError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
