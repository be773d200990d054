//! Gizi CLI - Command-line interface for the growth assessment engine
//!
//! Commands:
//! - assess: Assess a single measurement from flags
//! - batch: Process NDJSON measurements into NDJSON records (batch mode)
//! - validate: Load and check a reference-table directory

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use gizi_core::reference::{
    AgeLmsTable, HeightLmsTable, HEIGHT_FOR_AGE_FILE, WEIGHT_FOR_AGE_FILE,
    WEIGHT_FOR_HEIGHT_FILE,
};
use gizi_core::{
    GrowthEngine, GrowthError, Measurement, MeasurementInput, MeasurementRecord, Sex,
    ENGINE_VERSION, PRODUCER_NAME,
};

/// Gizi - Compute engine for WHO child growth standards
#[derive(Parser)]
#[command(name = "gizi")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Assess child measurements against WHO growth standards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a single measurement
    Assess {
        /// Directory holding lms_bbu.csv, lms_tbu.csv, lms_bbtb.csv
        #[arg(short, long)]
        reference_dir: PathBuf,

        /// Child sex (male/female; the register codes L/P also work)
        #[arg(long)]
        sex: Sex,

        /// Birth date (YYYY-MM-DD or the register's DD-MM-YYYY)
        #[arg(long, value_parser = gizi_core::age::parse_date)]
        birth_date: NaiveDate,

        /// Observation date, defaults to today
        #[arg(long, value_parser = gizi_core::age::parse_date)]
        observed_at: Option<NaiveDate>,

        /// Body weight in kilograms
        #[arg(long)]
        weight_kg: f64,

        /// Stature in centimeters
        #[arg(long)]
        height_cm: f64,

        /// Output the record as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Process NDJSON measurements into NDJSON measurement records
    Batch {
        /// Directory holding the reference tables
        #[arg(short, long)]
        reference_dir: PathBuf,

        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Load a reference directory and report table health
    Validate {
        /// Directory holding the reference tables
        #[arg(short, long)]
        reference_dir: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), GiziCliError> {
    match cli.command {
        Commands::Assess {
            reference_dir,
            sex,
            birth_date,
            observed_at,
            weight_kg,
            height_cm,
            json,
        } => cmd_assess(
            &reference_dir,
            sex,
            birth_date,
            observed_at,
            weight_kg,
            height_cm,
            json,
        ),

        Commands::Batch {
            reference_dir,
            input,
            output,
        } => cmd_batch(&reference_dir, &input, &output),

        Commands::Validate {
            reference_dir,
            json,
        } => cmd_validate(&reference_dir, json),
    }
}

fn cmd_assess(
    reference_dir: &Path,
    sex: Sex,
    birth_date: NaiveDate,
    observed_at: Option<NaiveDate>,
    weight_kg: f64,
    height_cm: f64,
    json: bool,
) -> Result<(), GiziCliError> {
    let engine = GrowthEngine::load_from_dir(reference_dir)?;

    let observed_at = observed_at.unwrap_or_else(gizi_core::age::today);
    let measurement = Measurement::new(
        Uuid::new_v4(),
        sex,
        birth_date,
        observed_at,
        weight_kg,
        height_cm,
    )?;

    let assessment = engine.assess(&measurement)?;
    let record = MeasurementRecord::from_assessment(&assessment);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Assessment ({observed_at})");
        println!("=======================");
        println!("Age:               {} months", record.age_months);
        println!("Weight:            {} kg", record.weight_kg);
        println!("Height:            {} cm", record.height_cm);
        println!(
            "Weight-for-age:    z = {:+.2} ({})",
            record.z_weight_for_age, record.status_weight_for_age
        );
        println!(
            "Height-for-age:    z = {:+.2} ({})",
            record.z_height_for_age, record.status_height_for_age
        );
        println!(
            "Weight-for-height: z = {:+.2} ({})",
            record.z_weight_for_height, record.status_weight_for_height
        );
        println!("Triage:            {}", record.triage);
    }

    Ok(())
}

fn cmd_batch(reference_dir: &Path, input: &Path, output: &Path) -> Result<(), GiziCliError> {
    let engine = GrowthEngine::load_from_dir(reference_dir)?;

    let input_data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading NDJSON measurements from terminal stdin (end with EOF)");
        }
        let mut buffer = String::new();
        io::stdin().lock().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let mut records: Vec<String> = Vec::new();
    let mut failures = 0usize;

    for (index, line) in input_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let result = serde_json::from_str::<MeasurementInput>(trimmed)
            .map_err(GrowthError::from)
            .and_then(|input| input.into_measurement())
            .and_then(|measurement| engine.assess(&measurement))
            .map(|assessment| MeasurementRecord::from_assessment(&assessment));

        match result {
            Ok(record) => records.push(serde_json::to_string(&record)?),
            Err(err) => {
                eprintln!("line {}: {}", index + 1, err);
                failures += 1;
            }
        }
    }

    let output_data = if records.is_empty() {
        String::new()
    } else {
        records.join("\n") + "\n"
    };

    if output.to_string_lossy() == "-" {
        print!("{output_data}");
        io::stdout().flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    if failures > 0 {
        Err(GiziCliError::BatchFailed(failures))
    } else {
        Ok(())
    }
}

fn cmd_validate(reference_dir: &Path, json: bool) -> Result<(), GiziCliError> {
    let tables = [
        (WEIGHT_FOR_AGE_FILE, TableKind::Age),
        (HEIGHT_FOR_AGE_FILE, TableKind::Age),
        (WEIGHT_FOR_HEIGHT_FILE, TableKind::Height),
    ];

    let mut checks: Vec<TableCheck> = Vec::new();

    for (file_name, kind) in tables {
        let path = reference_dir.join(file_name);
        let check = match fs::File::open(&path) {
            Ok(file) => {
                let (rows, skipped) = match kind {
                    TableKind::Age => {
                        let table = AgeLmsTable::from_reader(file)?;
                        (table.len(), table.skipped_rows())
                    }
                    TableKind::Height => {
                        let table = HeightLmsTable::from_reader(file)?;
                        (table.len(), table.skipped_rows())
                    }
                };
                let status = if rows == 0 {
                    CheckStatus::Error
                } else if skipped > 0 {
                    CheckStatus::Warning
                } else {
                    CheckStatus::Ok
                };
                TableCheck {
                    file: file_name.to_string(),
                    status,
                    rows,
                    skipped_rows: skipped,
                    message: None,
                }
            }
            Err(err) => TableCheck {
                file: file_name.to_string(),
                status: CheckStatus::Error,
                rows: 0,
                skipped_rows: 0,
                message: Some(err.to_string()),
            },
        };
        checks.push(check);
    }

    let report = ValidationReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        reference_dir: reference_dir.display().to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Reference Table Report");
        println!("======================");
        println!("Producer: {} {}", report.producer, report.version);
        println!("Directory: {}", report.reference_dir);
        println!();

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            match &check.message {
                Some(msg) => println!("  {} {}: {}", status_icon, check.file, msg),
                None => println!(
                    "  {} {}: {} rows loaded, {} skipped",
                    status_icon, check.file, check.rows, check.skipped_rows
                ),
            }
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(GiziCliError::ValidationFailed)
    } else {
        Ok(())
    }
}

enum TableKind {
    Age,
    Height,
}

// Error types

#[derive(Debug)]
enum GiziCliError {
    Io(io::Error),
    Engine(GrowthError),
    Json(serde_json::Error),
    BatchFailed(usize),
    ValidationFailed,
}

impl From<io::Error> for GiziCliError {
    fn from(e: io::Error) -> Self {
        GiziCliError::Io(e)
    }
}

impl From<GrowthError> for GiziCliError {
    fn from(e: GrowthError) -> Self {
        GiziCliError::Engine(e)
    }
}

impl From<serde_json::Error> for GiziCliError {
    fn from(e: serde_json::Error) -> Self {
        GiziCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<GiziCliError> for CliError {
    fn from(e: GiziCliError) -> Self {
        match e {
            GiziCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            GiziCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the measurement values and reference tables".to_string()),
            },
            GiziCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            GiziCliError::BatchFailed(count) => CliError {
                code: "BATCH_FAILED".to_string(),
                message: format!("{count} measurements failed"),
                hint: Some("See stderr for per-line errors".to_string()),
            },
            GiziCliError::ValidationFailed => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: "One or more reference tables failed validation".to_string(),
                hint: Some("Review the table report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    producer: String,
    version: String,
    reference_dir: String,
    checks: Vec<TableCheck>,
}

#[derive(serde::Serialize)]
struct TableCheck {
    file: String,
    status: CheckStatus,
    rows: usize,
    skipped_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
