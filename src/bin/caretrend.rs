//! caretrend CLI
//!
//! Commands:
//! - month-report: Compute a monthly report from fetched rows
//! - half-report: Compute the six-month trend report
//! - timeline: Build a month's 30-minute occupancy timelines
//! - commentary: Look up a resident's monthly commentary fields

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use caretrend::adapter;
use caretrend::commentary::find_month_commentary;
use caretrend::types::{MonthKey, ReportMode};
use caretrend::{EngineError, ReportEngine, ENGINE_VERSION};

/// caretrend - compute engine for bed-sensor care reports
#[derive(Parser)]
#[command(name = "caretrend")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Turn bed-sensor daily metrics into care report payloads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a monthly report from fetched rows
    MonthReport {
        /// Report month as YYYY-MM
        #[arg(long)]
        month: String,

        /// Daily rows JSON file (use - for stdin)
        #[arg(long)]
        daily: PathBuf,

        /// Body-turn events JSON file
        #[arg(long)]
        turns: Option<PathBuf>,

        /// Longest-lying duration rows JSON file
        #[arg(long)]
        durations: Option<PathBuf>,

        /// Override the classified report mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Compute the six-month trend report ending at the given month
    HalfReport {
        /// Reference month as YYYY-MM
        #[arg(long)]
        month: String,

        /// Daily rows JSON file (use - for stdin)
        #[arg(long)]
        daily: PathBuf,

        /// Body-turn events JSON file
        #[arg(long)]
        turns: Option<PathBuf>,

        /// Override the classified report mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Build a month's 30-minute occupancy timelines
    Timeline {
        /// Report month as YYYY-MM
        #[arg(long)]
        month: String,

        /// Bed-state events JSON file (use - for stdin)
        #[arg(long)]
        events: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Look up a resident's monthly commentary fields
    Commentary {
        /// Report month as YYYY-MM
        #[arg(long)]
        month: String,

        /// Commentary rows JSON file (use - for stdin)
        #[arg(long)]
        rows: PathBuf,

        /// Device serial number
        #[arg(long)]
        serial: String,

        /// Agency identifier
        #[arg(long, default_value = "")]
        agency: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Bed-bound rule set
    Bed,
    /// Ambulatory rule set
    Active,
}

impl From<ModeArg> for ReportMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Bed => ReportMode::Bed,
            ModeArg::Active => ReportMode::Active,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let engine = ReportEngine::new();

    match cli.command {
        Commands::MonthReport {
            month,
            daily,
            turns,
            durations,
            mode,
            output,
        } => {
            let month = parse_month(&month)?;
            let records = adapter::adapt_daily_rows(&read_input(&daily)?)?;
            let turn_events = match turns {
                Some(path) => adapter::adapt_turn_events(&read_input(&path)?)?,
                None => Vec::new(),
            };
            let longest_lying = match durations {
                Some(path) => adapter::adapt_longest_lying(&read_input(&path)?)?,
                None => Default::default(),
            };

            let payload = engine.month_report_payload(
                month,
                &records,
                &turn_events,
                &longest_lying,
                mode.map(Into::into),
            )?;
            write_output(&output, &payload)
        }

        Commands::HalfReport {
            month,
            daily,
            turns,
            mode,
            output,
        } => {
            let month = parse_month(&month)?;
            let records = adapter::adapt_daily_rows(&read_input(&daily)?)?;
            let turn_events = match turns {
                Some(path) => adapter::adapt_turn_events(&read_input(&path)?)?,
                None => Vec::new(),
            };

            let payload =
                engine.half_year_payload(month, &records, &turn_events, mode.map(Into::into))?;
            write_output(&output, &payload)
        }

        Commands::Timeline {
            month,
            events,
            output,
        } => {
            let month = parse_month(&month)?;
            let events = adapter::adapt_bed_state_events(&read_input(&events)?)?;

            let payload = engine.timeline_payload(month, &events)?;
            write_output(&output, &payload)
        }

        Commands::Commentary {
            month,
            rows,
            serial,
            agency,
        } => {
            let month = parse_month(&month)?;
            let rows = adapter::adapt_commentary_rows(&read_input(&rows)?)?;

            let fields = find_month_commentary(&rows, &serial, &agency, month.year, month.month);
            println!("{}", serde_json::to_string_pretty(&fields)?);
            Ok(())
        }
    }
}

fn parse_month(s: &str) -> Result<MonthKey, CliError> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| CliError::BadMonth(s.to_string()))?;
    let year: i32 = year.parse().map_err(|_| CliError::BadMonth(s.to_string()))?;
    let month: u32 = month
        .parse()
        .map_err(|_| CliError::BadMonth(s.to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(CliError::BadMonth(s.to_string()));
    }
    Ok(MonthKey::new(year, month))
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: &Path, payload: &str) -> Result<(), CliError> {
    if path.to_string_lossy() == "-" {
        println!("{payload}");
    } else {
        fs::write(path, payload)?;
    }
    Ok(())
}

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    BadMonth(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Json(e) => write!(f, "{e}"),
            CliError::BadMonth(s) => write!(f, "invalid month '{s}', expected YYYY-MM"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
