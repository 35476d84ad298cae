use droidscope_types::LogEntry;

/// Receiver of classified entries
///
/// Invoked on the pump task, one entry at a time and in emission order, so
/// implementations should be quick or hand work off elsewhere.
pub trait EntrySink: Send + Sync {
    fn on_entry(&self, entry: LogEntry);
}

impl<F> EntrySink for F
where
    F: Fn(LogEntry) + Send + Sync,
{
    fn on_entry(&self, entry: LogEntry) {
        self(entry)
    }
}
