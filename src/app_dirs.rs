use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_file() -> PathBuf {
        ProjectDirs::from("", "", "numquiz")
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("numquiz_config.json"))
    }

    /// Default location of board images when none is configured.
    pub fn asset_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "numquiz").map(|pd| pd.data_dir().join("assets"))
    }
}
