//! Application configuration: data-source paths, mapping policy, logging.
//!
//! Precedence is overrides > environment > file > defaults. The mapping
//! section becomes the immutable `MappingConfig` handed to the engine at
//! construction; nothing re-reads configuration mid-run.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::scoring::ScoringWeights;
use crate::matching::DEFAULT_WEIGHTS;

const DEFAULT_CONFIG_FILE: &str = "rfqmap.toml";
const ENV_PREFIX: &str = "RFQMAP_";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub data: DataConfig,
    pub mapping: MappingConfig,
    pub logging: LoggingConfig,
}

/// Where the catalog and alias JSON files live.
#[derive(Clone, Debug, PartialEq)]
pub struct DataConfig {
    pub catalog_path: PathBuf,
    /// Absent means rely on the built-in alias seed table.
    pub alias_path: Option<PathBuf>,
}

/// Engine policy knobs, supplied once at engine construction.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingConfig {
    pub auto_map_threshold: f64,
    pub confidence_delta: f64,
    pub default_size_tolerance_mm: f64,
    pub weights: ScoringWeights,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub alias_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub auto_map_threshold: Option<f64>,
    pub confidence_delta: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig { catalog_path: PathBuf::from("catalog.json"), alias_path: None },
            mapping: MappingConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            auto_map_threshold: 0.75,
            confidence_delta: 0.10,
            default_size_tolerance_mm: 2.0,
            weights: DEFAULT_WEIGHTS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    data: Option<FileDataConfig>,
    mapping: Option<FileMappingConfig>,
    logging: Option<FileLoggingConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct FileDataConfig {
    catalog_path: Option<PathBuf>,
    alias_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct FileMappingConfig {
    auto_map_threshold: Option<f64>,
    confidence_delta: Option<f64>,
    default_size_tolerance_mm: Option<f64>,
    weights: Option<ScoringWeights>,
}

#[derive(Debug, Default, Deserialize)]
struct FileLoggingConfig {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = options
            .config_path
            .clone()
            .or_else(|| env::var(format!("{ENV_PREFIX}CONFIG")).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        match fs::read_to_string(&path) {
            Ok(raw) => {
                let file: FileConfig = toml::from_str(&raw)
                    .map_err(|source| ConfigError::ParseFile { path: path.clone(), source })?;
                config.apply_file(file);
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                if options.require_file {
                    return Err(ConfigError::MissingConfigFile(path));
                }
            }
            Err(source) => return Err(ConfigError::ReadFile { path, source }),
        }

        config.apply_env()?;
        config.apply_overrides(&options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(data) = file.data {
            if let Some(path) = data.catalog_path {
                self.data.catalog_path = path;
            }
            if data.alias_path.is_some() {
                self.data.alias_path = data.alias_path;
            }
        }
        if let Some(mapping) = file.mapping {
            if let Some(value) = mapping.auto_map_threshold {
                self.mapping.auto_map_threshold = value;
            }
            if let Some(value) = mapping.confidence_delta {
                self.mapping.confidence_delta = value;
            }
            if let Some(value) = mapping.default_size_tolerance_mm {
                self.mapping.default_size_tolerance_mm = value;
            }
            if let Some(weights) = mapping.weights {
                self.mapping.weights = weights;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var(format!("{ENV_PREFIX}CATALOG_PATH")) {
            self.data.catalog_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var(format!("{ENV_PREFIX}ALIAS_PATH")) {
            self.data.alias_path = Some(PathBuf::from(value));
        }
        if let Ok(value) = env::var(format!("{ENV_PREFIX}LOG_LEVEL")) {
            self.logging.level = value;
        }
        if let Ok(value) = env::var(format!("{ENV_PREFIX}LOG_FORMAT")) {
            self.logging.format = parse_log_format(&value)
                .ok_or_else(|| ConfigError::InvalidEnvOverride {
                    key: format!("{ENV_PREFIX}LOG_FORMAT"),
                    value,
                })?;
        }
        self.mapping.auto_map_threshold =
            env_f64("AUTO_MAP_THRESHOLD", self.mapping.auto_map_threshold)?;
        self.mapping.confidence_delta =
            env_f64("CONFIDENCE_DELTA", self.mapping.confidence_delta)?;
        self.mapping.default_size_tolerance_mm =
            env_f64("DEFAULT_SIZE_TOLERANCE_MM", self.mapping.default_size_tolerance_mm)?;
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(path) = &overrides.catalog_path {
            self.data.catalog_path = path.clone();
        }
        if let Some(path) = &overrides.alias_path {
            self.data.alias_path = Some(path.clone());
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(value) = overrides.auto_map_threshold {
            self.mapping.auto_map_threshold = value;
        }
        if let Some(value) = overrides.confidence_delta {
            self.mapping.confidence_delta = value;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mapping = &self.mapping;
        if !(0.0..=1.0).contains(&mapping.auto_map_threshold) || mapping.auto_map_threshold == 0.0
        {
            return Err(ConfigError::Validation(format!(
                "auto_map_threshold must lie in (0, 1], got {}",
                mapping.auto_map_threshold
            )));
        }
        if !(0.0..1.0).contains(&mapping.confidence_delta) {
            return Err(ConfigError::Validation(format!(
                "confidence_delta must lie in [0, 1), got {}",
                mapping.confidence_delta
            )));
        }
        if mapping.default_size_tolerance_mm <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "default_size_tolerance_mm must be positive, got {}",
                mapping.default_size_tolerance_mm
            )));
        }

        let weights = &mapping.weights;
        let values = [weights.fuzzy, weights.size, weights.material, weights.alias];
        if values.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(ConfigError::Validation("scoring weights must be non-negative".into()));
        }
        if values.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::Validation("at least one scoring weight must be positive".into()));
        }
        Ok(())
    }
}

fn env_f64(suffix: &str, current: f64) -> Result<f64, ConfigError> {
    let key = format!("{ENV_PREFIX}{suffix}");
    match env::var(&key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnvOverride { key, value }),
        Err(_) => Ok(current),
    }
}

fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "compact" => Some(LogFormat::Compact),
        "pretty" => Some(LogFormat::Pretty),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}
