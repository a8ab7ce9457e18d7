// revsplit - monthly partner revenue reconciliation from settlement workbooks

mod classify;
mod exit_codes;
mod run;
mod settings;
mod uploads;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{io_exit_code, recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};
use revsplit_io::IoError;
use revsplit_recon::ReconError;

#[derive(Parser)]
#[command(name = "revsplit")]
#[command(about = "Split DI and DO revenue between two partners, month by month")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Defaults to <config dir>/revsplit/config.toml when present
    #[arg(long, global = true, env = "REVSPLIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log extraction details to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build monthly reports from DI workbooks and a DO ledger
    #[command(after_help = "\
Examples:
  revsplit run 'JPM October 2024.xlsx' 'JPM November 2024.xlsx' ledger.xlsx
  revsplit run *.xlsx --csv report.csv --xlsx report.xlsx
  revsplit run *.xlsx --csv - | column -ts,
  revsplit run *.xlsx --json > reports.json
  revsplit run *.xlsx --year 2023")]
    Run {
        /// Uploaded workbooks, in upload order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the detail CSV to a file (- for stdout)
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Write the Summary/Detail workbook to a file
        #[arg(long, value_name = "PATH")]
        xlsx: Option<PathBuf>,

        /// Print the full reports as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Reporting year used to pick the DO ledger sheet
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show how each workbook would be routed, without extracting
    #[command(after_help = "\
Examples:
  revsplit classify *.xlsx
  revsplit classify uploads/*.xlsx --json")]
    Classify {
        /// Workbooks to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run { files, csv, xlsx, json, year } => run::cmd_run(
            run::RunArgs { files, csv, xlsx, json, year },
            cli.config.as_deref(),
        ),
        Commands::Classify { files, json } => {
            classify::cmd_classify(files, json, cli.config.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `-v`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::NoDirectImportFiles => {
                Some("DI workbooks carry a 'Payment Detail' sheet; check uploads with `revsplit classify`")
            }
            ReconError::EmptyResult => Some("every DI file was empty after skipping rows; rerun with -v for skip counts"),
            ReconError::MissingColumn { .. } => {
                Some("header aliases are configurable under [direct.columns]")
            }
            ReconError::NoDomesticSheet { .. } => Some("the sheet marker is configurable as domestic.marker"),
            _ => None,
        };
        Self {
            code: recon_exit_code(&err),
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::UnsupportedFileType { .. } => Some("accepted: .xlsx .xlsm .xlsb .xls .ods"),
            IoError::Open { .. } => Some("is the file a spreadsheet saved by Excel or LibreOffice?"),
            _ => None,
        };
        Self {
            code: io_exit_code(&err),
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}
