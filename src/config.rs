//! Configuration management module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::labels::Language;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// What [`AppConfig::load_or_default`] did, kept so it can be logged once
/// the subscriber is installed.
#[derive(Debug)]
pub enum ConfigStatus {
    /// Config loaded from the file.
    Loaded,
    /// No file existed; defaults were written, or the write failed.
    Created(Option<ConfigError>),
    /// Config file exists but invalid; defaults are used in memory.
    Invalid(ConfigError),
}

impl ConfigStatus {
    /// Report the outcome of loading the config at `path`.
    pub fn log(&self, path: &Path) {
        match self {
            ConfigStatus::Loaded => tracing::info!("Config loaded successfully"),
            ConfigStatus::Created(None) => tracing::info!("Config missing, wrote defaults to {:?}", path),
            ConfigStatus::Created(Some(e)) => tracing::warn!("Could not write default config: {}", e),
            ConfigStatus::Invalid(e) => tracing::error!("Config invalid, using defaults: {}", e),
        }
    }
}

/// Longest dashboard rotation interval, one hour.
pub const MAX_ROTATION_SECS: u64 = 3600;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub dashboard: DashboardConfig,
    pub export: ExportConfig,
    pub ui: UiConfig,
}

/// Where the document and its backups are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Dashboard rotation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub rotation_secs: u64,
    pub page_size: usize,
}

/// Export defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Records listed in a chat message before the "more" footer.
    pub chat_max_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

/// UI preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub language: Language,
    /// Ask before deleting, restoring or overwriting.
    pub confirm_destructive: bool,
}

impl AppConfig {
    /// Config file path in the platform config directory, or the current
    /// directory in dev mode.
    pub fn default_path(dev: bool) -> PathBuf {
        if dev {
            return PathBuf::from("config.toml");
        }
        project_dirs()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Directory holding the document, backups and logs.
    pub fn data_dir(&self, dev: bool) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        if dev {
            return PathBuf::from("data");
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// Directory export dialogs open in and CLI exports default to.
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Load the config at `path`. A missing file is created with defaults;
    /// an invalid one is replaced by defaults in memory. Nothing is logged
    /// here: the data directory, and so the log file, depends on the result.
    pub fn load_or_default(path: &Path) -> (Self, ConfigStatus) {
        match Self::try_load(path) {
            ConfigLoadResult::Loaded(config) => (config, ConfigStatus::Loaded),
            ConfigLoadResult::Missing => {
                let config = Self::default();
                let written = config.save(path).err();
                (config, ConfigStatus::Created(written))
            }
            ConfigLoadResult::Invalid(e) => (Self::default(), ConfigStatus::Invalid(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_ROTATION_SECS).contains(&self.dashboard.rotation_secs) {
            return Err(ConfigError::Validation(format!(
                "Rotation interval must be between 1 and {MAX_ROTATION_SECS} seconds"
            )));
        }
        if !(1..=20).contains(&self.dashboard.page_size) {
            return Err(ConfigError::Validation(
                "Dashboard page size must be between 1 and 20".to_string(),
            ));
        }
        if !(1..=500).contains(&self.export.chat_max_rows) {
            return Err(ConfigError::Validation(
                "Chat message rows must be between 1 and 500".to_string(),
            ));
        }
        if let Some(dir) = &self.storage.data_dir
            && dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation("Data directory cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "school-supervisor", "school-supervisor")
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            rotation_secs: 5,
            page_size: 3,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            chat_max_rows: 30,
            export_dir: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            language: Language::En,
            confirm_destructive: true,
        }
    }
}
