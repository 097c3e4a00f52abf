use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Upper bound on the in-memory command log. The persisted table is unbounded.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// Directory holding history files. Relative paths resolve against the base dir.
    #[serde(default = "default_data_directory")]
    pub data_directory: String,
    #[serde(default = "default_csv_file")]
    pub csv_file: String,
    /// Save the persisted table after every successful calculation.
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
}

fn default_max_size() -> usize {
    5
}

fn default_data_directory() -> String {
    "data".to_string()
}

fn default_csv_file() -> String {
    "calculator_history.csv".to_string()
}

fn default_auto_save() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            data_directory: default_data_directory(),
            csv_file: default_csv_file(),
            auto_save: default_auto_save(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Standard,
    Scientific,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(OutputFormat::Standard),
            "scientific" => Ok(OutputFormat::Scientific),
            other => Err(Error::Config(format!(
                "Unknown output format '{}'. Options: standard, scientific",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Standard => write!(f, "standard"),
            OutputFormat::Scientific => write!(f, "scientific"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    #[serde(default = "default_decimal_precision")]
    pub decimal_precision: u32,
    /// Integer digits above which standard output switches to scientific notation.
    #[serde(default = "default_scientific_threshold")]
    pub scientific_threshold: u32,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_decimal_precision() -> u32 {
    10
}

fn default_scientific_threshold() -> u32 {
    10
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimal_precision: default_decimal_precision(),
            scientific_threshold: default_scientific_threshold(),
            output_format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Forces debug-level logging regardless of `level`.
    #[serde(default)]
    pub debug: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/calculator.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            debug: false,
        }
    }
}

impl LoggingConfig {
    pub fn effective_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.level
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(std::env::vars())
    }

    /// Apply `KEY=value` overrides. Keys this config does not know are ignored.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            match key {
                "MAX_HISTORY_SIZE" => self.history.max_size = parse_setting(key, value)?,
                "DATA_DIRECTORY" => self.history.data_directory = value.to_string(),
                "CSV_HISTORY_FILE" => self.history.csv_file = value.to_string(),
                "DECIMAL_PRECISION" => self.display.decimal_precision = parse_setting(key, value)?,
                "SCIENTIFIC_NOTATION_THRESHOLD" => {
                    self.display.scientific_threshold = parse_setting(key, value)?
                }
                "DEFAULT_OUTPUT_FORMAT" => self.display.output_format = value.parse()?,
                "LOG_LEVEL" => self.logging.level = value.to_lowercase(),
                "LOG_FILE" => self.logging.file = value.to_string(),
                "DEBUG_MODE" => self.logging.debug = value.eq_ignore_ascii_case("true"),
                _ => continue,
            }
            debug!(key, value, "Applied config override");
        }
        Ok(())
    }
}

fn parse_setting<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: '{}'", key, value)))
}
