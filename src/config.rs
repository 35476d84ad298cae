//! Configuration loading
//!
//! Settings come from `~/.droidscope/config.toml` (or an explicit `--config`
//! path), with command-line flags taking precedence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use droidscope_logs::DEFAULT_CAPACITY;

/// Contents of the TOML config file
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Explicit adb executable, instead of the bundled one
    pub adb_path: Option<PathBuf>,
    pub buffer_size: Option<usize>,
    /// Device serial to capture from
    pub serial: Option<String>,
}

impl FileConfig {
    /// Get the default config file path
    fn default_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(".droidscope").join("config.toml"))
    }

    /// Load from an explicit path, or from the default location if present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Effective settings after merging file and flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub adb_path: Option<PathBuf>,
    pub buffer_size: usize,
    pub serial: Option<String>,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        adb_path: Option<PathBuf>,
        buffer_size: Option<usize>,
        serial: Option<String>,
    ) -> Self {
        Self {
            adb_path: adb_path.or(file.adb_path),
            buffer_size: buffer_size.or(file.buffer_size).unwrap_or(DEFAULT_CAPACITY),
            serial: serial.or(file.serial),
        }
    }
}
