//! Log processing for droidscope
//!
//! This crate provides line classification, bounded buffering, and the
//! supervised log capture stream.

mod buffer;
mod error;
mod parser;
mod sink;
mod stream;

pub use buffer::{DEFAULT_CAPACITY, LogBuffer};
pub use error::{LogError, StreamError};
pub use parser::LogParser;
pub use sink::EntrySink;
pub use stream::{LogStreamManager, StreamConfig, StreamState};

// Re-export types used in our public API
pub use droidscope_types::{LogEntry, Severity, SeverityCounts};
