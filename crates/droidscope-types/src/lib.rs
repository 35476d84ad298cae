//! Shared types for droidscope
//!
//! This crate contains data structures used across multiple droidscope crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Log Types
// ============================================================================

/// Log severity tier, ordered from least to most severe
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Severity {
    #[default]
    Info,
    Error,
    Exception,
    Fatal,
}

impl Severity {
    /// Short display string (3 chars)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INF",
            Self::Error => "ERR",
            Self::Exception => "EXC",
            Self::Fatal => "FTL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "Info",
            Self::Error => "Error",
            Self::Exception => "Exception",
            Self::Fatal => "Fatal",
        };
        f.write_str(name)
    }
}

/// A single classified log line
///
/// Entries are immutable once created; the timestamp records when the line
/// was classified, not any time embedded in the line itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    timestamp: DateTime<Utc>,
    severity: Severity,
    message: String,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Utc>, severity: Severity, message: String) -> Self {
        Self {
            timestamp,
            severity,
            message,
        }
    }

    /// Moment the line was classified
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The original raw line, unmodified
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.as_str(), self.message)
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Counts per severity, computed from a snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub info: usize,
    pub error: usize,
    pub exception: usize,
    pub fatal: usize,
}

impl SeverityCounts {
    /// Tally a sequence of entries
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LogEntry>,
    {
        let mut counts = Self::default();
        for entry in entries {
            match entry.severity() {
                Severity::Info => counts.info += 1,
                Severity::Error => counts.error += 1,
                Severity::Exception => counts.exception += 1,
                Severity::Fatal => counts.fatal += 1,
            }
        }
        counts
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Info => self.info,
            Severity::Error => self.error,
            Severity::Exception => self.exception,
            Severity::Fatal => self.fatal,
        }
    }

    pub fn total(&self) -> usize {
        self.info + self.error + self.exception + self.fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(severity: Severity, message: &str) -> LogEntry {
        LogEntry::new(Utc::now(), severity, message.to_string())
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Error);
        assert!(Severity::Error < Severity::Exception);
        assert!(Severity::Exception < Severity::Fatal);
        let mut sorted = vec![Severity::Fatal, Severity::Info, Severity::Exception];
        sorted.sort();
        assert_eq!(sorted, [Severity::Info, Severity::Exception, Severity::Fatal]);
    }

    #[test]
    fn test_entry_display() {
        let e = entry(Severity::Fatal, "F/art: abort");
        assert_eq!(e.to_string(), "[FTL] F/art: abort");
        assert_eq!(Severity::Exception.to_string(), "Exception");
    }

    #[test]
    fn test_severity_counts() {
        let entries = vec![
            entry(Severity::Info, "a"),
            entry(Severity::Info, "b"),
            entry(Severity::Error, "c"),
            entry(Severity::Fatal, "d"),
        ];
        let counts = SeverityCounts::from_entries(&entries);
        assert_eq!(counts.get(Severity::Info), 2);
        assert_eq!(counts.error, 1);
        assert_eq!(counts.exception, 0);
        assert_eq!(counts.fatal, 1);
        assert_eq!(counts.total(), entries.len());
    }

    #[test]
    fn test_entry_serializes_to_json() {
        let e = entry(Severity::Error, "E/Tag: boom");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["severity"], "Error");
        assert_eq!(json["message"], "E/Tag: boom");
        assert!(json["timestamp"].is_string());
    }
}
