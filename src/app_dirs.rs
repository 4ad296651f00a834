use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", "wfhtrack") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("wfhtrack_config.json")
        }
    }

    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("wfhtrack");
            Some(state_dir.join("wfhtrack.log"))
        } else {
            ProjectDirs::from("", "", "wfhtrack")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("wfhtrack.log"))
        }
    }
}
