//! Command-level tests against real temp files.

use std::io::Write;

use rfqmap_cli::commands::{self, build_engine};
use rfqmap_core::config::{AppConfig, DataConfig, LoadOptions};

const CATALOG_JSON: &str = r#"[
  {"code":"NFC25","family":"corrugated_flexible_pipe","description":"25mm corrugated pp pipe",
   "uom":"metre","material":"pp","alternate_material":null,"gauge":null,
   "nominal_size_mm":25.0,"size_tolerance_mm":2.0,"unit_rate":"12.50",
   "lead_time_days":7,"min_order_qty":100},
  {"code":"NFC32","family":"corrugated_flexible_pipe","description":"32mm corrugated pp pipe",
   "uom":"metre","material":"pp","alternate_material":null,"gauge":null,
   "nominal_size_mm":32.0,"size_tolerance_mm":2.0,"unit_rate":"14.00",
   "lead_time_days":7,"min_order_qty":100}
]"#;

fn write_catalog() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("catalog file");
    file.write_all(CATALOG_JSON.as_bytes()).expect("write catalog");
    file
}

fn config_with_catalog(catalog: &tempfile::NamedTempFile) -> AppConfig {
    AppConfig {
        data: DataConfig { catalog_path: catalog.path().to_path_buf(), alias_path: None },
        ..AppConfig::default()
    }
}

#[test]
fn probe_reports_full_explanation() {
    let catalog = write_catalog();
    let config = config_with_catalog(&catalog);

    let result = commands::probe::run(&Ok(config), "25mm corrugated PP pipe", 100.0);
    assert_eq!(result.exit_code, 0);

    let report: serde_json::Value = serde_json::from_str(&result.output).expect("json");
    assert_eq!(report["normalized"]["size_mm"], 25.0);
    assert_eq!(report["normalized"]["material"], "pp");
    assert_eq!(report["result"]["status"], "auto_mapped");
    assert_eq!(report["result"]["selected_sku"], "NFC25");
    assert!(report["result"]["explanation"]["breakdown"]["size"].as_f64().unwrap() > 0.9);
}

#[test]
fn map_command_processes_a_batch_file() {
    let catalog = write_catalog();
    let config = config_with_catalog(&catalog);

    let mut input = tempfile::NamedTempFile::new().expect("input file");
    input
        .write_all(
            br#"[
              {"text": "25mm corrugated PP pipe", "quantity": 100, "uom": "metre"},
              {"text": "unknown brass fitting", "quantity": 5}
            ]"#,
        )
        .expect("write input");

    let result = commands::map::run(&Ok(config), input.path(), false);
    assert_eq!(result.exit_code, 0);

    let results: serde_json::Value = serde_json::from_str(&result.output).expect("json");
    assert_eq!(results.as_array().unwrap().len(), 2);
    assert_eq!(results[0]["status"], "auto_mapped");
}

#[test]
fn build_engine_falls_back_to_seed_aliases() {
    let catalog = write_catalog();
    let config = config_with_catalog(&catalog);

    let engine = build_engine(&config).expect("engine");
    assert!(!engine.aliases().is_empty());
    assert_eq!(engine.catalog().len(), 2);
}

#[test]
fn map_fails_cleanly_when_catalog_is_missing() {
    let config = AppConfig {
        data: DataConfig { catalog_path: "absent-catalog.json".into(), alias_path: None },
        ..AppConfig::default()
    };

    let mut input = tempfile::NamedTempFile::new().expect("input file");
    input.write_all(br#"[{"text": "25mm pipe"}]"#).expect("write input");

    let result = commands::map::run(&Ok(config), input.path(), false);
    assert_eq!(result.exit_code, 1);
    assert!(result.output.contains("error"));
}

#[test]
fn config_load_validates_mapping_section() {
    let mut file = tempfile::NamedTempFile::new().expect("config file");
    file.write_all(b"[mapping]\nconfidence_delta = 2.0\n").expect("write");

    let loaded = AppConfig::load(LoadOptions {
        config_path: Some(file.path().to_path_buf()),
        ..LoadOptions::default()
    });
    assert!(loaded.is_err());

    let result = commands::doctor::run(&loaded, false);
    assert_eq!(result.exit_code, 1);
}
