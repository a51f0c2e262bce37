use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::runtime::MAX_REFRESH_MS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Timer refresh while a workout is running, clamped to 1..=1000
    pub refresh_interval_ms: u64,
    /// Ring the terminal bell on pause/resume/finish
    pub sound: bool,
    /// Keep finished workouts in the history tables
    pub record_history: bool,
    /// Open the active workout straight away when launching the TUI
    pub resume_on_launch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_ms: MAX_REFRESH_MS,
            sound: true,
            record_history: true,
            resume_on_launch: true,
        }
    }
}

impl Config {
    pub fn refresh_interval_ms(&self) -> u64 {
        self.refresh_interval_ms.clamp(1, MAX_REFRESH_MS)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
