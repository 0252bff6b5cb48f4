use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "IMDB_TRAKT_SYNC_CONFIG";

const APP_DIR: &str = "imdb-trakt-sync";

pub struct PathManager {
    config_dir: PathBuf,
}

impl PathManager {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Config file to read: explicit path, then `$IMDB_TRAKT_SYNC_CONFIG`, then the platform default
    pub fn resolve_config_file(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config_file())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // ~/.config/imdb-trakt-sync on Linux; fall back to the working directory
        let base = dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR));
        Self::new(base)
    }
}
