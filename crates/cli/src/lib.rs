pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rfqmap_core::config::{AppConfig, ConfigError, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "rfqmap",
    about = "RFQ-to-SKU mapping CLI",
    long_about = "Map free-text procurement request lines onto catalog SKUs, \
                  probe single descriptions, and inspect mapping configuration.",
    after_help = "Examples:\n  rfqmap map lines.json\n  rfqmap probe \"25mm corrugated PP pipe\"\n  rfqmap doctor --json"
)]
pub struct Cli {
    /// Path to the rfqmap.toml config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Map a JSON file of request lines to catalog SKUs")]
    Map {
        /// JSON file containing an array of request lines.
        input: PathBuf,
        #[arg(long, help = "Pretty-print the JSON output")]
        pretty: bool,
    },
    #[command(about = "Map a single free-text description and show the full explanation")]
    Probe {
        text: String,
        #[arg(long, default_value_t = 1.0)]
        quantity: f64,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, catalog, and alias-source readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn init_logging(config: Option<&AppConfig>) {
    use rfqmap_core::config::LogFormat;
    use tracing::Level;

    let (level, format) = match config {
        Some(config) => (
            config.logging.level.parse::<Level>().unwrap_or(Level::INFO),
            config.logging.format,
        ),
        None => (Level::INFO, LogFormat::Compact),
    };

    // try_init: the library surface may be driven twice from tests
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(level);
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let loaded: Result<AppConfig, ConfigError> = AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    });
    init_logging(loaded.as_ref().ok());

    let result = match cli.command {
        Command::Map { input, pretty } => commands::map::run(&loaded, &input, pretty),
        Command::Probe { text, quantity } => commands::probe::run(&loaded, &text, quantity),
        Command::Config => commands::config::run(&loaded, cli.config.as_deref()),
        Command::Doctor { json } => commands::doctor::run(&loaded, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
