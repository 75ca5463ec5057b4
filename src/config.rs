use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::ingest::{IngestOptions, WritePolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    #[serde(default)]
    pub write_policy: WritePolicy,

    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    #[serde(default = "default_milestone_interval")]
    pub milestone_interval: u64,

    pub report_path: Option<String>,
}

fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("newsload")
        .join("news.db")
        .to_string_lossy()
        .to_string()
}

fn default_csv_path() -> String {
    "OnlineNewsPopularity.csv".to_string()
}

fn default_progress_interval() -> u64 {
    10
}

fn default_milestone_interval() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            csv_path: default_csv_path(),
            write_policy: WritePolicy::default(),
            progress_interval: default_progress_interval(),
            milestone_interval: default_milestone_interval(),
            report_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsload")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.progress_interval == 0 || self.milestone_interval == 0 {
            return Err(AppError::Config(
                "progress_interval and milestone_interval must be positive".to_string(),
            ));
        }
        if self.db_path.trim().is_empty() {
            return Err(AppError::Config("db_path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Creates the directory holding the database file.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = Path::new(&self.db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            write_policy: self.write_policy,
            progress_interval: self.progress_interval,
            milestone_interval: self.milestone_interval,
        }
    }
}
