pub mod config;
pub mod doctor;
pub mod map;
pub mod probe;

use rfqmap_core::config::AppConfig;
use rfqmap_core::errors::ApplicationError;
use rfqmap_core::matching::MappingEngine;
use rfqmap_core::providers::{FileAliasProvider, FileCatalogProvider, InMemoryAliasProvider};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn output(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(command: &str, error_class: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code: 1, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Build the mapping engine from the configured data sources.
pub fn build_engine(config: &AppConfig) -> Result<MappingEngine, ApplicationError> {
    let catalog = FileCatalogProvider::new(&config.data.catalog_path);
    match &config.data.alias_path {
        Some(path) => {
            MappingEngine::from_providers(&catalog, &FileAliasProvider::new(path), &config.mapping)
        }
        None => MappingEngine::from_providers(
            &catalog,
            &InMemoryAliasProvider::default(),
            &config.mapping,
        ),
    }
}
