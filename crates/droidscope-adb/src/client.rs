use std::sync::Arc;

use crate::error::AdbError;
use crate::launcher::ProcessLauncher;

/// A device reported by `adb devices`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdbDevice {
    pub serial: String,
    /// Connection state as reported by adb (`device`, `offline`, `unauthorized`, ...)
    pub state: String,
}

impl AdbDevice {
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }
}

/// One-shot adb queries
pub struct AdbClient<L: ProcessLauncher> {
    launcher: Arc<L>,
}

impl<L: ProcessLauncher> AdbClient<L> {
    pub fn new(launcher: Arc<L>) -> Self {
        Self { launcher }
    }

    /// List attached devices
    ///
    /// A failing `adb devices` invocation yields an empty list.
    pub async fn devices(&self) -> Result<Vec<AdbDevice>, AdbError> {
        let path = self.launcher.tool_path();
        if !self.launcher.tool_exists(&path) {
            return Err(AdbError::NotFound(path));
        }

        let output = self.launcher.run(&path, &["devices".to_string()]).await?;
        if !output.success() {
            tracing::warn!(
                exit_code = output.exit_code,
                stderr = %output.stderr.trim(),
                "adb devices failed"
            );
            return Ok(Vec::new());
        }

        Ok(parse_devices(&output.stdout))
    }
}

/// Parse the output of `adb devices`
pub fn parse_devices(stdout: &str) -> Vec<AdbDevice> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| {
            !line
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("list of devices")
        })
        .filter_map(|line| {
            let parts: Vec<&str> = line
                .split('\t')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            match parts.as_slice() {
                [serial, state] => Some(AdbDevice {
                    serial: serial.to_string(),
                    state: state.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}
