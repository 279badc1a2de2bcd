//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

/// Database file name within the data directory
const DB_FILE: &str = "quickscribe.db";

/// QuickScribe configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the database file
    pub data_dir: Option<PathBuf>,

    /// Project selected when no `--project` is given
    pub default_project: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/quickscribe/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Environment variables
        if let Ok(data_dir) = std::env::var("QS_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(data_dir));
        }
        if let Ok(project) = std::env::var("QS_PROJECT") {
            config.default_project = Some(project);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "quickscribe")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.default_project.is_some() {
            self.default_project = other.default_project;
        }
    }

    /// Resolve the database file path
    ///
    /// Falls back to the platform data directory
    /// (e.g. `~/.local/share/quickscribe/`) when no data dir is configured.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(DB_FILE)
    }

    /// Resolve the data directory
    pub fn data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.data_dir {
            return dir.clone();
        }

        directories::ProjectDirs::from("", "", "quickscribe")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
