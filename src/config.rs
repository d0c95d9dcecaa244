use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BASE_URL_ENV: &str = "HELPDESK_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory available")]
    NoConfigDir,
    #[error("failed to access settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self { base_url: String::new(), log_level: "info".to_string() }
    }
}

impl Settings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("helpdesk.toml"))
    }

    /// Reads the settings file, falling back to defaults, then applies the
    /// environment override.
    pub fn load() -> Self {
        let mut settings = match Self::toml_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|err| {
                log::warn!("ignoring settings at {}: {err}", path.display());
                Self::default()
            }),
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            settings.apply_base_url_override(&url);
        }
        settings
    }

    /// Missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::toml_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_base_url_override(&mut self, url: &str) {
        if !url.trim().is_empty() {
            self.base_url = url.trim().to_string();
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
