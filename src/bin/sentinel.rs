//! Sentinel CLI - Command-line interface for Pulse Sentinel
//!
//! Commands:
//! - analyze: Ingest reading records and emit one analysis summary per record
//! - validate: Range-check reading records
//! - config: Print the effective engine configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pulse_sentinel::schema::{ReadingRecord, RecordAdapter, SCHEMA_VERSION};
use pulse_sentinel::types::AnalysisSummary;
use pulse_sentinel::{
    EarlyWarningEngine, EngineConfig, InMemoryStore, SentinelError, PRODUCER_NAME, SENTINEL_VERSION,
};

/// Sentinel - Early-warning engine for wearable biometric streams
#[derive(Parser)]
#[command(name = "sentinel")]
#[command(version = SENTINEL_VERSION)]
#[command(about = "Detect physiological deviations and project cardiovascular risk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest reading records and emit analysis summaries
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Range-check reading records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective engine configuration
    Config {
        /// Engine configuration file to load over the defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one summary per line)
    Ndjson,
    /// JSON array of summaries
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SentinelCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            config,
        } => cmd_analyze(&input, &output, input_format, output_format, config.as_deref()),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Config { config, json } => cmd_config(config.as_deref(), json),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), SentinelCliError> {
    let config = load_config(config)?;
    let records = read_records(input, input_format)?;

    if records.is_empty() {
        return Err(SentinelCliError::NoRecords);
    }

    let engine = EarlyWarningEngine::with_config(InMemoryStore::new(), config)?;
    let mut summaries: Vec<AnalysisSummary> = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for (index, record) in records.into_iter().enumerate() {
        if let Err(e) = record.validate() {
            log::warn!("Skipping record {index} for {}: {e}", record.user_id);
            skipped += 1;
            continue;
        }

        engine.ingest(&record.user_id, record.reading.clone())?;
        let summary = engine.full_analysis(&record.user_id, &record.reading, record.profile)?;
        summaries.push(summary);
    }

    if skipped > 0 {
        log::warn!("{skipped} invalid records skipped");
    }
    if summaries.is_empty() {
        return Err(SentinelCliError::ValidationFailed(skipped));
    }

    let output_data = format_output(&summaries, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), SentinelCliError> {
    let records = read_records(input, input_format)?;
    let failures = RecordAdapter::validate_records(&records);

    let report = ValidationReport {
        schema_version: SCHEMA_VERSION.to_string(),
        total_records: records.len(),
        valid_records: records.len() - failures.len(),
        invalid_records: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                user_id: f.user_id.clone(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - User {} (index {}): {}", err.user_id, err.index, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(SentinelCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_config(config: Option<&Path>, json: bool) -> Result<(), SentinelCliError> {
    let config = load_config(config)?;

    if json {
        println!("{}", config.to_json()?);
    } else {
        println!("{} {}", PRODUCER_NAME, SENTINEL_VERSION);
        println!("==========================");
        println!("Minimum baseline days:   {}", config.min_baseline_days);
        println!("Calibration days:        {}", config.calibration_days);
        println!("Rolling window days:     {}", config.rolling_window_days);
        println!("Sigma (yellow / red):    {} / {}", config.sigma_yellow, config.sigma_red);
        println!("Activity percentile:     {}", config.activity_percentile);
        println!("Min context readings:    {}", config.min_context_readings);
        println!("Min trend history:       {}", config.min_trend_history);
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, SentinelCliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?)
}

fn read_records(input: &Path, input_format: InputFormat) -> Result<Vec<ReadingRecord>, SentinelCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            log::warn!("Reading records from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match input_format {
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => RecordAdapter::parse_array(&input_data)?,
    };
    Ok(records)
}

fn format_output(summaries: &[AnalysisSummary], format: &OutputFormat) -> Result<String, SentinelCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for summary in summaries {
                lines.push(serde_json::to_string(summary)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(summaries)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(summaries)?),
    }
}

// Error types

#[derive(Debug)]
enum SentinelCliError {
    Io(io::Error),
    Engine(SentinelError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
}

impl From<io::Error> for SentinelCliError {
    fn from(e: io::Error) -> Self {
        SentinelCliError::Io(e)
    }
}

impl From<SentinelError> for SentinelCliError {
    fn from(e: SentinelError) -> Self {
        SentinelCliError::Engine(e)
    }
}

impl From<serde_json::Error> for SentinelCliError {
    fn from(e: serde_json::Error) -> Self {
        SentinelCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SentinelCliError> for CliError {
    fn from(e: SentinelCliError) -> Self {
        match e {
            SentinelCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SentinelCliError::Engine(e @ SentinelError::ConfigError(_)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'sentinel config --json' for a valid template".to_string()),
            },
            SentinelCliError::Engine(e @ SentinelError::Store(_)) => CliError {
                code: "STORE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            SentinelCliError::Engine(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {} schema", SCHEMA_VERSION)),
            },
            SentinelCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SentinelCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            SentinelCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Run 'sentinel validate' for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    schema_version: String,
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    user_id: String,
    error: String,
}
