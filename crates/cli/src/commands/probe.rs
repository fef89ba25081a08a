//! Ad-hoc "test this description" surface for manual tuning.

use rfqmap_core::config::{AppConfig, ConfigError};
use rfqmap_core::domain::catalog::UnitOfMeasure;
use rfqmap_core::domain::line::{NormalizedLine, RawTokens, RequestLine};
use rfqmap_core::domain::mapping::MappingResult;
use serde::Serialize;

use super::CommandResult;

/// Full probe report: how the text was read, and how it mapped.
#[derive(Debug, Serialize)]
struct ProbeReport {
    text: String,
    tokens: RawTokens,
    normalized: NormalizedLine,
    result: MappingResult,
}

pub fn run(config: &Result<AppConfig, ConfigError>, text: &str, quantity: f64) -> CommandResult {
    let config = match config {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("probe", "config", error.to_string()),
    };

    let engine = match super::build_engine(config) {
        Ok(engine) => engine,
        Err(error) => return CommandResult::failure("probe", "engine", error.to_string()),
    };

    let line = RequestLine::from_text(text, quantity, UnitOfMeasure::Piece);
    let result = engine.map_line(&line);
    let report = ProbeReport {
        text: line.text.clone(),
        tokens: line.tokens.clone(),
        normalized: line.normalized.clone(),
        result,
    };

    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult::output(output),
        Err(error) => CommandResult::failure("probe", "serialization", error.to_string()),
    }
}
