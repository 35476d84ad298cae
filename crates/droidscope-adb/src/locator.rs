use std::path::{Path, PathBuf};

/// Location of the adb binary relative to the droidscope executable
#[cfg(windows)]
const BUNDLED_ADB_PATH: &str = "tools/adb/adb.exe";
#[cfg(not(windows))]
const BUNDLED_ADB_PATH: &str = "tools/adb/adb";

/// Resolves where the adb executable is expected to live
#[derive(Clone, Debug, Default)]
pub struct AdbLocator {
    /// Explicit path from configuration, bypassing the bundled location
    override_path: Option<PathBuf>,
}

impl AdbLocator {
    /// Locator for the adb bundled next to the running executable
    pub fn bundled() -> Self {
        Self::default()
    }

    /// Locator that always resolves to the given path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            override_path: Some(path.into()),
        }
    }

    /// Resolve the expected adb path
    ///
    /// Deterministic and side-effect free: the file is not checked here.
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.override_path {
            return path.clone();
        }

        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(BUNDLED_ADB_PATH)
    }

    /// Check whether an executable file exists at the given path
    pub fn is_present(path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_path_wins() {
        let locator = AdbLocator::with_path("/opt/android/adb");
        assert_eq!(locator.resolve(), PathBuf::from("/opt/android/adb"));
    }

    #[test]
    fn test_bundled_path_is_next_to_executable() {
        let resolved = AdbLocator::bundled().resolve();
        assert!(resolved.ends_with(BUNDLED_ADB_PATH));
        assert_eq!(resolved, AdbLocator::bundled().resolve());
    }

    #[test]
    fn test_is_present() {
        let dir = tempfile::tempdir().unwrap();
        let adb = dir.path().join("adb");
        assert!(!AdbLocator::is_present(&adb));

        std::fs::write(&adb, b"").unwrap();
        assert!(AdbLocator::is_present(&adb));

        // Directories are not executables
        assert!(!AdbLocator::is_present(dir.path()));
    }
}
