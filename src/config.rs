use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::export::ExportFormat;
use crate::gedcom::{GedcomOptions, DEFAULT_SOURCE};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub oralgen: OralgenConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Folder layout and logging
#[derive(Debug, Clone, Deserialize)]
pub struct OralgenConfig {
    /// Directory holding saved interview sessions (`*.json`).
    pub sessions_folder: PathBuf,
    /// Directory that receives exported `.ged` / `.csv` files.
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,
    /// Default `env_logger` filter for the binaries; `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Export settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// `1 SOUR` value in the GEDCOM header.
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_include_death")]
    pub include_death: bool,
    /// Formats written by `export --all` and the watcher.
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            include_death: default_include_death(),
            formats: default_formats(),
        }
    }
}

impl ExportConfig {
    pub fn gedcom_options(&self) -> GedcomOptions {
        GedcomOptions {
            source: self.source.clone(),
            include_death: self.include_death,
        }
    }
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("exports")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_include_death() -> bool {
    false
}

fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Gedcom]
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in ORALGEN_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("ORALGEN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Invalid configuration TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.oralgen.sessions_folder.exists() {
            anyhow::bail!(
                "sessions_folder path does not exist: {}. Set sessions_folder in config.toml to your saved sessions directory.",
                self.oralgen.sessions_folder.display()
            );
        }

        if !self.oralgen.sessions_folder.is_dir() {
            anyhow::bail!(
                "sessions_folder must be a directory, not a file: {}",
                self.oralgen.sessions_folder.display()
            );
        }

        if self.oralgen.log_level.parse::<log::LevelFilter>().is_err() {
            anyhow::bail!(
                "log_level must be one of off, error, warn, info, debug, trace (got {:?})",
                self.oralgen.log_level
            );
        }

        if self.export.source.trim().is_empty() {
            anyhow::bail!("export.source must not be empty");
        }

        if self.export.source.contains(['\n', '\r']) {
            anyhow::bail!("export.source must be a single line");
        }

        if self.export.formats.is_empty() {
            anyhow::bail!("export.formats must list at least one format");
        }

        Ok(())
    }

    pub fn sessions_folder(&self) -> &Path {
        &self.oralgen.sessions_folder
    }

    pub fn output_folder(&self) -> &Path {
        &self.oralgen.output_folder
    }
}
