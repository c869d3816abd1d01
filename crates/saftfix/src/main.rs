//! Binary entry point for the saftfix CLI.
//!
//! Thin front door over `saftfix-core`: collects the two file paths and the
//! per-collection configuration, invokes the repair run once, and renders the
//! returned change log (text or JSON). Exit codes follow the stable
//! `OutputErrorCode` table.
//!
//! ## Usage
//!
//! ```bash
//! # Inline configuration, one --sales per document-type code
//! saftfix in.xml out.xml --sales FT=A:X --working W:WX
//!
//! # Configuration from a JSON file, machine-readable output
//! saftfix in.xml out.xml --config fix.json --format json
//! ```

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use saftfix_core::{FixConfig, SaftError, SeriesConfig};

use saftfix::report::{self, ErrorResponse, FixResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Repair duplicate document numbers in SAFT XML exports.
///
/// Duplicate identifiers within the sales-invoice and working-document
/// collections are rewritten with a fresh series/counter numbering; the first
/// occurrence of each identifier is left untouched.
#[derive(Parser, Debug)]
#[command(name = "saftfix", version, about = "Repair duplicate document numbers in SAFT XML exports")]
struct Cli {
    /// Source SAFT file (must exist).
    input: PathBuf,

    /// Destination file (parent directory must exist).
    output: PathBuf,

    /// Sales configuration for one document-type code, as `CODE=SERIES:PREFIX`
    /// (e.g. `FT=A:X`). Repeat per code.
    #[arg(long, value_parser = parse_sales_spec)]
    sales: Vec<(String, SeriesConfig)>,

    /// Working-documents configuration, as `SERIES:PREFIX` (e.g. `W:WX`).
    #[arg(long, value_parser = parse_series_spec)]
    working: Option<SeriesConfig>,

    /// Initial counter value for every scope.
    #[arg(long, default_value_t = 1)]
    start: u64,

    /// JSON configuration file (alternative to --sales/--working/--start).
    #[arg(long, conflicts_with_all = ["sales", "working", "start"])]
    config: Option<PathBuf>,

    /// Output format for the change log.
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Output format for the change log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Human-readable text summary (default).
    #[default]
    Text,
    /// JSON response envelope.
    Json,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Parse a sales spec in `CODE=SERIES:PREFIX` format.
fn parse_sales_spec(s: &str) -> Result<(String, SeriesConfig), String> {
    let (code, rest) = s.split_once('=').ok_or_else(|| {
        format!("invalid sales spec '{s}', expected 'CODE=SERIES:PREFIX' (e.g. 'FT=A:X')")
    })?;
    if code.trim().is_empty() {
        return Err(format!("invalid sales spec '{s}', document-type code is empty"));
    }
    let config = parse_series_spec(rest)
        .map_err(|_| format!("invalid sales spec '{s}', expected 'CODE=SERIES:PREFIX'"))?;
    Ok((code.trim().to_string(), config))
}

/// Parse a series spec in `SERIES:PREFIX` format.
fn parse_series_spec(s: &str) -> Result<SeriesConfig, String> {
    let (series, prefix) = s.split_once(':').ok_or_else(|| {
        format!("invalid series spec '{s}', expected 'SERIES:PREFIX' (e.g. 'W:WX')")
    })?;
    if series.trim().is_empty() || prefix.trim().is_empty() {
        return Err(format!("invalid series spec '{s}', series and prefix must be non-empty"));
    }
    Ok(SeriesConfig::new(series.trim(), prefix.trim()))
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let format = cli.format;
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.error_code();
            match format {
                Format::Json => {
                    let response = ErrorResponse::from_error(&err);
                    let _ = report::emit_response(&response, &mut io::stdout());
                    let _ = io::stdout().flush();
                }
                Format::Text => eprintln!("error: {err}"),
            }
            ExitCode::from(code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the repair run and render its change log.
fn execute(cli: Cli) -> Result<(), SaftError> {
    let config = build_config(&cli)?;
    let changes = saftfix_core::fix_file(&cli.input, &cli.output, &config)?;

    match cli.format {
        Format::Text => print!("{}", report::render_text(&changes)),
        Format::Json => {
            report::emit_response(&FixResponse::new(changes), &mut io::stdout())
                .map_err(|e| SaftError::internal(format!("failed to write response: {e}")))?;
        }
    }
    Ok(())
}

/// Assemble the run configuration from the JSON file or the inline flags.
fn build_config(cli: &Cli) -> Result<FixConfig, SaftError> {
    if let Some(path) = &cli.config {
        let file = File::open(path).map_err(|e| {
            SaftError::configuration(format!("cannot open config file {}: {e}", path.display()))
        })?;
        let config: FixConfig = serde_json::from_reader(file).map_err(|e| {
            SaftError::configuration(format!("invalid config file {}: {e}", path.display()))
        })?;
        return Ok(config);
    }
    let mut config = FixConfig {
        working: cli.working.clone(),
        start: cli.start,
        ..FixConfig::default()
    };
    for (code, series) in &cli.sales {
        config.sales.insert(code.clone(), series.clone());
    }
    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================
