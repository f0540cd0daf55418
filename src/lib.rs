//! Calendar feature extraction for scheduled events
//!
//! Reads semicolon-delimited event records, normalizes them into typed
//! timestamps and category codes, and derives a fixed-width feature matrix
//! of calendar features around each event's date.

pub mod calendar;
pub mod data;
pub mod export;
pub mod features;
pub mod pipeline;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use calendar::{GermanHolidays, HolidayCalendar, HolidayTable, Region};
pub use data::{LabelTable, RawRow};
pub use features::{DateFeature, FeatureExtractor, FeatureMatrix, WeekIndexMode};
pub use pipeline::extract_from_resource;

/// Integer code of an event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCode(pub u32);

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category({})", self.0)
    }
}

/// A single event record after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub labels: Vec<CategoryCode>,
}

impl NormalizedRecord {
    /// Date the feature window is centered on
    pub fn anchor_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Time between start and end. Negative when the end time precedes the start.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Resource not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    #[error("Malformed row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("Invalid date format: {0:?} (expected DD.MM.YYYY)")]
    InvalidDateFormat(String),

    #[error("Invalid time format: {0:?} (expected HH:MM:SS)")]
    InvalidTimeFormat(String),

    #[error("Invalid calendar date: {0}")]
    InvalidCalendarDate(String),

    #[error("Unknown category: {token:?}")]
    UnknownCategory { token: String },

    #[error("Unsupported holiday region: {0}")]
    UnsupportedRegion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeatureError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub features: FeatureConfig,
    pub holidays: HolidayConfig,
    pub labels: LabelTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory resource names are resolved against
    pub resource_dir: String,
    pub extension: String,
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            resource_dir: "res".to_string(),
            extension: "csv".to_string(),
            delimiter: ';',
        }
    }
}

impl DataConfig {
    /// Path of the file backing a named resource
    pub fn resource_path(&self, name: &str) -> PathBuf {
        Path::new(&self.resource_dir).join(format!("{}.{}", name, self.extension))
    }

    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(FeatureError::Config(format!(
                "Delimiter must be an ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Number of days in the window around each anchor date
    pub time_range: usize,
    pub num_features_per_date: usize,
    /// Day the ordinal feature counts from
    pub epoch: NaiveDate,
    pub week_index: WeekIndexMode,
    /// Holiday names flagged in the Christmas column
    pub christmas: Vec<String>,
    /// Holiday names flagged in the Easter column
    pub easter: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            time_range: 8,
            num_features_per_date: DateFeature::COUNT,
            epoch: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            week_index: WeekIndexMode::FirstOffset,
            christmas: vec![
                calendar::german::FIRST_CHRISTMAS_DAY.to_string(),
                calendar::german::SECOND_CHRISTMAS_DAY.to_string(),
            ],
            easter: vec![calendar::german::EASTER_MONDAY.to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayConfig {
    /// Jurisdiction code with optional subdivision, e.g. "DE-NI"
    pub region: String,
    /// Years preloaded into the calendar
    pub years: Vec<i32>,
    /// Also load every year touched by a record's window
    pub expand_years: bool,
}

impl Default for HolidayConfig {
    fn default() -> Self {
        HolidayConfig {
            region: "DE-NI".to_string(),
            years: (2015..=2020).collect(),
            expand_years: true,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeatureError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FeatureError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FeatureError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
