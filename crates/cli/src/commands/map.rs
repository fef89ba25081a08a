//! Batch mapping of request lines from a JSON file.

use std::fs;
use std::path::Path;

use anyhow::Context;
use rfqmap_core::config::{AppConfig, ConfigError};
use rfqmap_core::domain::catalog::UnitOfMeasure;
use rfqmap_core::domain::line::{RawTokens, RequestLine};
use serde::Deserialize;
use tracing::info;

use super::CommandResult;

/// One request line as supplied by the caller.
///
/// Tokens are optional: when absent they are extracted heuristically from the
/// text, matching the probe path.
#[derive(Debug, Deserialize)]
struct LineSpec {
    text: String,
    #[serde(default = "default_quantity")]
    quantity: f64,
    #[serde(default)]
    uom: Option<UnitOfMeasure>,
    #[serde(default)]
    tokens: Option<RawTokens>,
}

fn default_quantity() -> f64 {
    1.0
}

impl LineSpec {
    fn into_line(self) -> RequestLine {
        let uom = self.uom.unwrap_or(UnitOfMeasure::Piece);
        match self.tokens {
            Some(tokens) => RequestLine::new(self.text, self.quantity, uom, tokens),
            None => RequestLine::from_text(self.text, self.quantity, uom),
        }
    }
}

pub fn run(
    config: &Result<AppConfig, ConfigError>,
    input: &Path,
    pretty: bool,
) -> CommandResult {
    let config = match config {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("map", "config", error.to_string()),
    };

    match map_file(config, input, pretty) {
        Ok(output) => CommandResult::output(output),
        Err(error) => CommandResult::failure("map", "mapping", format!("{error:#}")),
    }
}

fn map_file(config: &AppConfig, input: &Path, pretty: bool) -> anyhow::Result<String> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("could not read input file `{}`", input.display()))?;
    let specs: Vec<LineSpec> = serde_json::from_str(&raw)
        .with_context(|| format!("could not parse input file `{}`", input.display()))?;

    let engine = super::build_engine(config)?;
    let lines: Vec<RequestLine> = specs.into_iter().map(LineSpec::into_line).collect();
    let results = engine.map_lines(&lines);

    info!(
        event_name = "cli.map.completed",
        line_count = lines.len(),
        auto_mapped = results
            .iter()
            .filter(|r| r.status == rfqmap_core::domain::mapping::MappingStatus::AutoMapped)
            .count(),
        "batch mapping completed"
    );

    let output = if pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    Ok(output)
}
