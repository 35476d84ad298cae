use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating or launching adb
#[derive(Debug, Error)]
pub enum AdbError {
    /// The executable is not present at the resolved path
    #[error("adb not found at {}", .0.display())]
    NotFound(PathBuf),

    /// The OS refused to spawn the process
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child was spawned without a piped stdout
    #[error("process stdout was not captured")]
    MissingStdout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
