//! CLI-specific error types and exit code mapping

use netlog_core::error::NetlogError;
use netlog_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The run finished but some source files could not be converted.
    #[error("run completed with {failed} failed file(s)")]
    RunFailed { failed: u64 },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from netlog-core.
    ///
    /// Pipeline errors arrive here through `NetlogError` as well.
    #[error("{0}")]
    Core(#[from] NetlogError),
}

impl From<LogPipelineError> for CliError {
    fn from(err: LogPipelineError) -> Self {
        Self::Core(err.into())
    }
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 3    | Run completed with failed files      |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(NetlogError::Config(_)) => 2,
            Self::RunFailed { .. } => 3,
            Self::Io(_) | Self::Core(NetlogError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}
