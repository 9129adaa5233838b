use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "gomi-quiz";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory for log files, under $HOME/.local/state when HOME is set.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_end_with_app_name() {
        if let Some(dir) = AppDirs::state_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
        if let Some(path) = AppDirs::config_path() {
            assert!(path.ends_with("config.json"));
        }
    }
}
