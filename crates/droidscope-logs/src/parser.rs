use chrono::Utc;

use droidscope_types::{LogEntry, Severity};

use crate::error::LogError;

/// Keyword heuristics, checked in priority order; first match wins
const SEVERITY_PATTERNS: [(&[&str], Severity); 3] = [
    (&["fatal", "f/"], Severity::Fatal),
    (&["exception"], Severity::Exception),
    (&["error", "e/"], Severity::Error),
];

/// Classifier turning raw device log lines into entries
pub struct LogParser;

impl LogParser {
    /// Classify a raw line, stamping it with the current time
    ///
    /// Empty or whitespace-only lines are rejected.
    pub fn classify(raw: &str) -> Result<LogEntry, LogError> {
        if raw.trim().is_empty() {
            return Err(LogError::InvalidArgument("log line must not be empty"));
        }

        Ok(LogEntry::new(
            Utc::now(),
            Self::detect_severity(raw),
            raw.to_string(),
        ))
    }

    /// ASCII case-insensitive keyword scan
    pub fn detect_severity(line: &str) -> Severity {
        let lower = line.to_ascii_lowercase();

        for (needles, severity) in SEVERITY_PATTERNS {
            if needles.iter().any(|needle| lower.contains(needle)) {
                return severity;
            }
        }

        Severity::Info
    }
}
