//! Effective-configuration inspection with source attribution.

use std::env;
use std::fs;
use std::path::Path;

use rfqmap_core::config::{AppConfig, ConfigError, LogFormat};
use toml_source::FileDoc;

use super::CommandResult;

pub fn run(config: &Result<AppConfig, ConfigError>, config_path: Option<&Path>) -> CommandResult {
    let config = match config {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("config", "config", error.to_string());
        }
    };

    let doc = FileDoc::load(config_path);
    let mut lines =
        vec!["effective config (source precedence: overrides > env > file > default):".to_string()];

    lines.push(render(
        "data.catalog_path",
        &config.data.catalog_path.display().to_string(),
        source_of(&doc, "data", "catalog_path", "RFQMAP_CATALOG_PATH"),
    ));
    lines.push(render(
        "data.alias_path",
        &config
            .data
            .alias_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<seed table>".to_string()),
        source_of(&doc, "data", "alias_path", "RFQMAP_ALIAS_PATH"),
    ));
    lines.push(render(
        "mapping.auto_map_threshold",
        &config.mapping.auto_map_threshold.to_string(),
        source_of(&doc, "mapping", "auto_map_threshold", "RFQMAP_AUTO_MAP_THRESHOLD"),
    ));
    lines.push(render(
        "mapping.confidence_delta",
        &config.mapping.confidence_delta.to_string(),
        source_of(&doc, "mapping", "confidence_delta", "RFQMAP_CONFIDENCE_DELTA"),
    ));
    lines.push(render(
        "mapping.default_size_tolerance_mm",
        &config.mapping.default_size_tolerance_mm.to_string(),
        source_of(&doc, "mapping", "default_size_tolerance_mm", "RFQMAP_DEFAULT_SIZE_TOLERANCE_MM"),
    ));
    let weights = &config.mapping.weights;
    lines.push(render(
        "mapping.weights",
        &format!(
            "fuzzy={} size={} material={} alias={}",
            weights.fuzzy, weights.size, weights.material, weights.alias
        ),
        source_of(&doc, "mapping", "weights", ""),
    ));
    lines.push(render(
        "logging.level",
        &config.logging.level,
        source_of(&doc, "logging", "level", "RFQMAP_LOG_LEVEL"),
    ));
    lines.push(render(
        "logging.format",
        match config.logging.format {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        },
        source_of(&doc, "logging", "format", "RFQMAP_LOG_FORMAT"),
    ));

    CommandResult::output(lines.join("\n"))
}

fn render(key: &str, value: &str, source: String) -> String {
    format!("  {key} = {value}  ({source})")
}

fn source_of(doc: &Option<FileDoc>, section: &str, key: &str, env_key: &str) -> String {
    if !env_key.is_empty() && env::var(env_key).is_ok() {
        return format!("env {env_key}");
    }
    if let Some(doc) = doc {
        if doc.contains(section, key) {
            return format!("file {}", doc.path);
        }
    }
    "default".to_string()
}

mod toml_source {
    use super::*;

    /// Parsed config file, used only to attribute value sources.
    pub struct FileDoc {
        pub path: String,
        value: toml::Value,
    }

    impl FileDoc {
        pub fn load(config_path: Option<&Path>) -> Option<Self> {
            let path = config_path
                .map(Path::to_path_buf)
                .or_else(|| env::var("RFQMAP_CONFIG").ok().map(Into::into))
                .unwrap_or_else(|| "rfqmap.toml".into());
            let raw = fs::read_to_string(&path).ok()?;
            let value = raw.parse::<toml::Value>().ok()?;
            Some(Self { path: path.display().to_string(), value })
        }

        pub fn contains(&self, section: &str, key: &str) -> bool {
            self.value.get(section).and_then(|s| s.get(key)).is_some()
        }
    }
}
