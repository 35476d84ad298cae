use std::path::PathBuf;
use thiserror::Error;

/// Caller errors from the classifier and buffer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Reasons a stream failed to start
#[derive(Debug, Error)]
pub enum StreamError {
    /// The log capture executable is not where it is expected
    #[error("log capture tool not found at {}", .0.display())]
    ExternalToolMissing(PathBuf),

    /// The OS refused to spawn the log capture process
    #[error("failed to start log capture process: {0}")]
    ProcessStartFailure(#[source] droidscope_adb::AdbError),

    /// The manager has been shut down
    #[error("log stream manager has been shut down")]
    ShutDown,

    /// The caller's cancellation fired while waiting to start
    #[error("start cancelled")]
    Cancelled,
}
