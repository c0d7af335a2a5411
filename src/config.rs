//! Conversion configuration
//!
//! Loaded from an optional TOML file; every field has a default so a file
//! may set only what differs. CLI flags override file values.
//!
//! ```toml
//! start_year = 2025
//! start_week = 27
//! header_row = 0
//! export_name = "OHJP 2e contractjaar VITAAL"
//! fixed_group_name = "Vaste objecten"
//! horizon_mode = "legacy"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MIN_START_YEAR: i32 = 2025;
pub const MAX_START_YEAR: i32 = 2100;

/// How the planning-horizon threshold is compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HorizonMode {
    /// Concatenated "yyyyww" key compared against the raw start week
    #[default]
    Legacy,
    /// Real (year, week) comparison
    YearWeek,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("start_year {0} is outside {MIN_START_YEAR}-{MAX_START_YEAR}")]
    StartYear(i32),

    #[error("start_week {0} is outside 1-52")]
    StartWeek(u32),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// First year of the maintenance plan
    pub start_year: i32,
    /// Week the plan starts in; also the first week column (default 27)
    pub start_week: u32,
    /// Zero-based header row of the export (CSV input)
    pub header_row: usize,
    /// Workbook file name without extension
    pub export_name: String,
    /// Sheet for every task that is not part of a named complex
    pub fixed_group_name: String,
    pub horizon_mode: HorizonMode,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            start_year: MIN_START_YEAR,
            start_week: 27,
            header_row: 0,
            export_name: "OHJP [X]e contractjaar VITAAL".to_string(),
            fixed_group_name: "fixed objects".to_string(),
            horizon_mode: HorizonMode::Legacy,
        }
    }
}

impl ConversionConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ConversionConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_START_YEAR..=MAX_START_YEAR).contains(&self.start_year) {
            return Err(ConfigError::StartYear(self.start_year));
        }
        if !(1..=52).contains(&self.start_week) {
            return Err(ConfigError::StartWeek(self.start_week));
        }
        if self.fixed_group_name.trim().is_empty() {
            return Err(ConfigError::Empty("fixed_group_name"));
        }
        if self.export_name.trim().is_empty() {
            return Err(ConfigError::Empty("export_name"));
        }
        Ok(())
    }

    /// `<export_name>.xlsx` inside `dir`
    pub fn workbook_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.xlsx", self.export_name))
    }
}
