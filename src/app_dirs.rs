use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "pushit";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `~/.local/state/pushit`, or the platform's local data dir without `HOME`
    pub fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".local").join("state").join(APP_NAME)
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(format!(".{APP_NAME}")))
        }
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from(format!("{APP_NAME}_config.json"))
        }
    }

    pub fn db_path() -> PathBuf {
        Self::state_dir().join(format!("{APP_NAME}.db"))
    }

    pub fn workout_snapshot_path() -> PathBuf {
        Self::state_dir().join("active_workout.json")
    }

    pub fn log_dir() -> PathBuf {
        Self::state_dir().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_state_dir() {
        let state = AppDirs::state_dir();
        assert!(AppDirs::db_path().starts_with(&state));
        assert!(AppDirs::workout_snapshot_path().starts_with(&state));
        assert!(AppDirs::log_dir().starts_with(&state));
        assert!(AppDirs::db_path().ends_with("pushit.db"));
    }
}
