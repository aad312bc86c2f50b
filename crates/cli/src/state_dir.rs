//! Platform-specific state directory management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// File name of the optional configuration file
pub const CONFIG_FILE: &str = "luxe.toml";

/// Manages platform-specific application directories
pub struct StateDir {
    project_dirs: Option<ProjectDirs>,
    /// Set from `--data-dir` or `LUXE_STATE_DIR`
    override_dir: Option<PathBuf>,
}

impl StateDir {
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("salon", "Luxe", "luxe");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    /// Keep everything under a single directory
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Use `path` when given, else the platform directories
    pub fn resolve(path: Option<PathBuf>) -> Self {
        path.map_or_else(Self::new, Self::with_override)
    }

    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        self.project_dirs
            .as_ref()
            .map_or_else(|| PathBuf::from("./config"), |dirs| dirs.config_dir().to_path_buf())
    }

    /// Directory holding the session token, the snapshot and the log
    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        self.project_dirs
            .as_ref()
            .map_or_else(|| PathBuf::from("./data"), |dirs| dirs.data_dir().to_path_buf())
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    /// Where the persisted store snapshot lives
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}.json", luxe_core::store::STORE_KEY))
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("luxe.log")
    }

    /// Create all required directories
    pub fn create_directories(&self) -> Result<()> {
        for dir in [self.config_dir(), self.data_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            debug!("Ensured directory exists: {}", dir.display());
        }
        Ok(())
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_directory() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = StateDir::resolve(Some(temp_dir.path().to_path_buf()));

        assert_eq!(state_dir.config_dir(), temp_dir.path().join("config"));
        assert_eq!(state_dir.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            state_dir.snapshot_path(),
            temp_dir.path().join("data").join("luxe-cx.json")
        );
        assert_eq!(
            state_dir.config_path(),
            temp_dir.path().join("config").join("luxe.toml")
        );
    }

    #[test]
    fn test_create_directories() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = StateDir::with_override(temp_dir.path());

        state_dir.create_directories().unwrap();

        assert!(state_dir.config_dir().exists());
        assert!(state_dir.data_dir().exists());
    }
}
