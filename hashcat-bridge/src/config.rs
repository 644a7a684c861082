//! Host options for engine sessions

use crate::types::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the engine finds its shared files and which executable path it reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostOptions {
    /// Engine shared folder (kernels, modules, charsets)
    #[serde(default)]
    pub shared_path: PathBuf,

    /// Path passed as argv[0]; defaults to the current executable
    #[serde(default)]
    pub executable_path: Option<PathBuf>,
}

impl HostOptions {
    /// Create host options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the engine shared folder
    pub fn with_shared_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.shared_path = path.into();
        self
    }

    /// Builder method: set the executable path
    pub fn with_executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Check the options and fill in the executable path when unset
    ///
    /// The shared path must be non-empty; it is not required to exist yet.
    /// An explicitly set executable path must exist.
    pub fn validate(&mut self) -> Result<()> {
        if self.shared_path.as_os_str().is_empty() {
            return Err(BridgeError::NoSharedPath);
        }

        let unset = self
            .executable_path
            .as_deref()
            .map_or(true, |p| p.as_os_str().is_empty());

        if unset {
            self.executable_path = Some(std::env::current_exe()?);
        } else if let Some(path) = self.executable_path.as_deref().filter(|p| !p.exists()) {
            return Err(BridgeError::InvalidExecutablePath(path.display().to_string()));
        }

        log::debug!(
            "Host options: shared={:?} executable={:?}",
            self.shared_path,
            self.executable_path
        );
        Ok(())
    }

    /// Executable path, falling back to an empty path before validation
    pub fn executable(&self) -> &Path {
        self.executable_path.as_deref().unwrap_or_else(|| Path::new(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_shared_path() {
        let mut options = HostOptions::new();
        assert!(matches!(options.validate(), Err(BridgeError::NoSharedPath)));
    }

    #[test]
    fn test_executable_defaults_to_current() {
        let mut options = HostOptions::new().with_shared_path("/deadbeef");
        options.validate().unwrap();

        let current = std::env::current_exe().unwrap();
        assert_eq!(options.executable(), current.as_path());
    }

    #[test]
    fn test_missing_executable_rejected() {
        let mut options = HostOptions::new()
            .with_shared_path("/tmp")
            .with_executable_path("/nope");
        assert!(matches!(
            options.validate(),
            Err(BridgeError::InvalidExecutablePath(_))
        ));
    }

    #[test]
    fn test_existing_executable_kept() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("hashcat.bin");
        std::fs::write(&exe, b"").unwrap();

        let mut options = HostOptions::new()
            .with_shared_path(dir.path())
            .with_executable_path(&exe);
        options.validate().unwrap();
        assert_eq!(options.executable(), exe.as_path());
    }
}
