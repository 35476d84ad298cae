//! adb process plumbing for droidscope
//!
//! This crate locates the bundled adb executable, launches it either as a
//! one-shot command or as a long-running line stream, and enumerates devices.

mod client;
mod error;
mod launcher;
mod locator;

pub use client::{AdbClient, AdbDevice, parse_devices};
pub use error::AdbError;
pub use launcher::{
    CommandOutput, LineStream, ProcessHandle, ProcessLauncher, SpawnedProcess, TokioLauncher,
};
pub use locator::AdbLocator;
