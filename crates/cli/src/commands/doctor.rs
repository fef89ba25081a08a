//! Preflight readiness checks for the mapping data sources.

use rfqmap_core::config::{AppConfig, ConfigError};
use rfqmap_core::providers::{
    AliasProvider, CatalogProvider, FileAliasProvider, FileCatalogProvider,
};
use serde::Serialize;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    ok: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: String,
    checks: Vec<Check>,
}

pub fn run(config: &Result<AppConfig, ConfigError>, json: bool) -> CommandResult {
    let mut checks = Vec::new();

    let config = match config {
        Ok(config) => {
            checks.push(Check { name: "config", ok: true, detail: "configuration loaded".into() });
            config
        }
        Err(error) => {
            checks.push(Check { name: "config", ok: false, detail: error.to_string() });
            return finish(checks, json);
        }
    };

    let catalog = FileCatalogProvider::new(&config.data.catalog_path);
    match catalog.all_entries() {
        Ok(entries) if entries.is_empty() => checks.push(Check {
            name: "catalog",
            ok: false,
            detail: format!("catalog `{}` is empty", config.data.catalog_path.display()),
        }),
        Ok(entries) => checks.push(Check {
            name: "catalog",
            ok: true,
            detail: format!("{} entries loaded", entries.len()),
        }),
        Err(error) => {
            checks.push(Check { name: "catalog", ok: false, detail: error.to_string() })
        }
    }

    match &config.data.alias_path {
        Some(path) => match FileAliasProvider::new(path).alias_entries() {
            Ok(entries) if entries.is_empty() => checks.push(Check {
                name: "aliases",
                ok: true,
                detail: "alias source empty, seed table will be used".into(),
            }),
            Ok(entries) => checks.push(Check {
                name: "aliases",
                ok: true,
                detail: format!("{} aliases loaded", entries.len()),
            }),
            Err(error) => {
                checks.push(Check { name: "aliases", ok: false, detail: error.to_string() })
            }
        },
        None => checks.push(Check {
            name: "aliases",
            ok: true,
            detail: "no alias source configured, seed table will be used".into(),
        }),
    }

    finish(checks, json)
}

fn finish(checks: Vec<Check>, json: bool) -> CommandResult {
    let all_ok = checks.iter().all(|check| check.ok);
    let status = if all_ok { "ok" } else { "failed" };

    let output = if json {
        let report = DoctorReport { status: status.to_string(), checks };
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!("{{\"status\":\"failed\",\"detail\":\"{error}\"}}")
        })
    } else {
        let mut lines = vec![format!("doctor: {status}")];
        for check in &checks {
            let mark = if check.ok { "ok" } else { "FAIL" };
            lines.push(format!("  [{mark}] {}: {}", check.name, check.detail));
        }
        lines.join("\n")
    };

    CommandResult { exit_code: u8::from(!all_ok), output }
}
