use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use droidscope_adb::{LineStream, ProcessHandle, ProcessLauncher};

use crate::buffer::LogBuffer;
use crate::error::StreamError;
use crate::parser::LogParser;
use crate::sink::EntrySink;

/// Lifecycle of the stream controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    Starting,
    Active,
    Stopping,
}

/// Arguments handed to the log capture tool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    pub args: Vec<String>,
}

impl StreamConfig {
    /// Capture from a specific device serial
    pub fn for_device(serial: &str) -> Self {
        Self {
            args: vec!["-s".to_string(), serial.to_string(), "logcat".to_string()],
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            args: vec!["logcat".to_string()],
        }
    }
}

/// Why a pump loop exited
#[derive(Debug)]
enum PumpExit {
    Cancelled,
    EndOfStream,
    ReadFailed(std::io::Error),
}

/// One run of the log capture process
struct Session {
    handle: Arc<dyn ProcessHandle>,
    cancel: CancellationToken,
    pump: JoinHandle<()>,
}

/// Manages the single log capture stream for one device
///
/// Start and stop are serialized through one async gate that is held only
/// across state transitions; the pump itself never touches it.
pub struct LogStreamManager<L: ProcessLauncher> {
    launcher: Arc<L>,

    /// Entries from every session, retained across restarts
    buffer: LogBuffer,

    config: StreamConfig,

    /// Start/stop gate, owning the current session if any
    gate: tokio::sync::Mutex<Option<Session>>,

    /// Current process, readable without taking the gate
    process: RwLock<Option<Arc<dyn ProcessHandle>>>,

    state: Arc<Mutex<StreamState>>,

    shut_down: AtomicBool,
}

impl<L: ProcessLauncher> LogStreamManager<L> {
    /// Create a new log stream manager
    pub fn new(launcher: Arc<L>, buffer: LogBuffer, config: StreamConfig) -> Self {
        Self {
            launcher,
            buffer,
            config,
            gate: tokio::sync::Mutex::new(None),
            process: RwLock::new(None),
            state: Arc::new(Mutex::new(StreamState::Idle)),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Buffer receiving every classified entry
    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn state(&self) -> StreamState {
        *self.state.lock()
    }

    /// Whether a capture process exists and has not exited
    ///
    /// Informational only: the process may exit right after this returns.
    pub fn is_running(&self) -> bool {
        self.process
            .read()
            .as_ref()
            .is_some_and(|process| !process.has_exited())
    }

    /// Start streaming, delivering each classified line to `sink`
    ///
    /// Returns immediately if a stream is already active. Cancelling `cancel`
    /// ends the stream and releases the process; the finished session is
    /// reclaimed by the next `start` or `stop`.
    pub async fn start<S>(&self, sink: S, cancel: CancellationToken) -> Result<(), StreamError>
    where
        S: EntrySink + 'static,
    {
        let mut slot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            guard = self.gate.lock() => guard,
        };

        if self.shut_down.load(Ordering::Acquire) {
            return Err(StreamError::ShutDown);
        }

        if self.session_active(&slot) {
            tracing::debug!("log stream already running");
            return Ok(());
        }

        // A previous session may have ended on its own; release it first
        self.teardown(&mut slot).await;

        self.set_state(StreamState::Starting);

        let path = self.launcher.tool_path();
        if !self.launcher.tool_exists(&path) {
            self.set_state(StreamState::Idle);
            return Err(StreamError::ExternalToolMissing(path));
        }

        let spawned = match self.launcher.spawn_lines(&path, &self.config.args) {
            Ok(spawned) => spawned,
            Err(e) => {
                self.set_state(StreamState::Idle);
                return Err(StreamError::ProcessStartFailure(e));
            }
        };

        let token = cancel.child_token();
        let handle = spawned.handle;
        *self.process.write() = Some(Arc::clone(&handle));

        // Mark active before the pump can run, so an instant end of stream
        // is not overwritten
        self.set_state(StreamState::Active);

        let pump = tokio::spawn(pump_lines(
            spawned.lines,
            Arc::clone(&handle),
            self.buffer.clone(),
            Arc::new(sink),
            token.clone(),
            Arc::clone(&self.state),
        ));

        tracing::info!(pid = ?handle.id(), args = ?self.config.args, "log stream started");

        *slot = Some(Session {
            handle,
            cancel: token,
            pump,
        });

        Ok(())
    }

    /// Stop streaming and release the process
    ///
    /// A no-op when nothing is running.
    pub async fn stop(&self) {
        let mut slot = self.gate.lock().await;
        self.teardown(&mut slot).await;
    }

    /// Stop and refuse any further starts; safe to call repeatedly
    pub async fn shutdown(&self) {
        let mut slot = self.gate.lock().await;
        self.teardown(&mut slot).await;
        self.shut_down.store(true, Ordering::Release);
    }

    /// A session counts as active until its pump has left the `Active` state,
    /// even if the killed process has not been reaped yet
    fn session_active(&self, slot: &Option<Session>) -> bool {
        slot.as_ref().is_some_and(|session| !session.pump.is_finished())
            && self.state() == StreamState::Active
            && self.is_running()
    }

    /// Cancel the pump, wait for it, then release the process (gate held)
    async fn teardown(&self, slot: &mut Option<Session>) {
        let Some(session) = slot.take() else {
            return;
        };

        self.set_state(StreamState::Stopping);
        session.cancel.cancel();

        if let Err(e) = session.pump.await {
            if e.is_panic() {
                tracing::warn!("log pump panicked; session torn down");
            } else {
                tracing::debug!(error = %e, "log pump did not complete");
            }
        }

        session.handle.terminate();
        *self.process.write() = None;
        self.set_state(StreamState::Idle);
        tracing::info!(pid = ?session.handle.id(), "log stream stopped");
    }

    fn set_state(&self, state: StreamState) {
        *self.state.lock() = state;
    }
}

impl<L: ProcessLauncher> Drop for LogStreamManager<L> {
    fn drop(&mut self) {
        if let Some(session) = self.gate.get_mut().take() {
            session.cancel.cancel();
            session.pump.abort();
            session.handle.terminate();
        }
    }
}

/// Read lines until end of output or cancellation, classifying and
/// delivering each non-blank one
async fn pump_lines(
    mut lines: LineStream,
    handle: Arc<dyn ProcessHandle>,
    buffer: LogBuffer,
    sink: Arc<dyn EntrySink>,
    cancel: CancellationToken,
    state: Arc<Mutex<StreamState>>,
) {
    let exit = loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            next = lines.next() => Some(next),
        };

        let line = match next {
            None => break PumpExit::Cancelled,
            Some(None) => break PumpExit::EndOfStream,
            Some(Some(Err(e))) => break PumpExit::ReadFailed(e),
            Some(Some(Ok(line))) => line,
        };

        if line.trim().is_empty() {
            continue;
        }

        match LogParser::classify(&line) {
            Ok(entry) => {
                buffer.push(entry.clone());
                sink.on_entry(entry);
            }
            Err(e) => tracing::debug!(error = %e, "skipping unclassifiable line"),
        }
    };

    match &exit {
        PumpExit::Cancelled => tracing::debug!("log pump cancelled"),
        PumpExit::EndOfStream => tracing::warn!("log stream ended unexpectedly"),
        PumpExit::ReadFailed(e) => tracing::warn!(error = %e, "log stream read failed"),
    }

    // Outside Active, a teardown is in progress and releases the process
    let mut state = state.lock();
    if *state == StreamState::Active {
        *state = StreamState::Idle;
        handle.terminate();
    }
}
