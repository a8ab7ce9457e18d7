//! `revsplit run` - build monthly reports and write exports.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use revsplit_io::{csv, json, xlsx};
use revsplit_recon::model::{Category, Partner};
use revsplit_recon::{route_uploads, run_pipeline, MonthlyReport};

use crate::exit_codes::EXIT_ERROR;
use crate::settings::load_config;
use crate::uploads::load_uploads;
use crate::CliError;

pub struct RunArgs {
    pub files: Vec<PathBuf>,
    pub csv: Option<PathBuf>,
    pub xlsx: Option<PathBuf>,
    pub json: bool,
    pub year: Option<i32>,
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn write_err(path: &Path, e: impl std::fmt::Display) -> CliError {
    CliError::new(EXIT_ERROR, format!("cannot write {}: {e}", path.display()))
}

pub fn cmd_run(args: RunArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let csv_to_stdout = args.csv.as_deref().map(is_stdout).unwrap_or(false);
    if csv_to_stdout && args.json {
        return Err(CliError::args("--csv - and --json both write to stdout; pick one"));
    }

    let mut config = load_config(config_path)?;
    if let Some(year) = args.year {
        config.domestic.reporting_year = Some(year);
    }

    let uploads = load_uploads(&args.files)?;
    let mut batch = route_uploads(uploads.files, &config);
    batch.rejected.splice(0..0, uploads.rejected);
    for rejected in &batch.rejected {
        eprintln!("skipped {}: {}", rejected.filename, rejected.reason);
    }
    debug!(
        direct = batch.direct.len(),
        domestic = batch.domestic.is_some(),
        rejected = batch.rejected.len(),
        "routed uploads"
    );

    let reports = run_pipeline(&batch.direct, batch.domestic.as_ref(), &config)?;
    for report in &reports {
        let counts = &report.row_counts;
        debug!(
            month = %report.month,
            di_rows = counts.di_rows,
            do_rows = counts.do_rows,
            di_skipped = counts.di_skipped.total(),
            do_skipped = counts.do_skipped.total(),
            "report built"
        );
    }

    if let Some(ref path) = args.csv {
        if csv_to_stdout {
            let stdout = std::io::stdout();
            csv::write_delimited(&reports, stdout.lock())?;
        } else {
            let text = csv::to_delimited_text(&reports)?;
            std::fs::write(path, text).map_err(|e| write_err(path, e))?;
            eprintln!("wrote {}", path.display());
        }
    }

    if let Some(ref path) = args.xlsx {
        let bytes = xlsx::to_spreadsheet(&reports)?;
        std::fs::write(path, bytes).map_err(|e| write_err(path, e))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        let json_str = json::to_json(&reports)?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let ledger = batch
        .domestic
        .as_ref()
        .map(|f| f.filename.as_str())
        .unwrap_or("none");
    eprintln!(
        "{} report(s) from {} DI file(s); DO ledger: {}",
        reports.len(),
        batch.direct.len(),
        ledger
    );
    let mut stderr = std::io::stderr().lock();
    write_summary_table(&mut stderr, &reports).map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;

    Ok(())
}

const COLUMNS: [(Category, Partner); 4] = [
    (Category::DirectImport, Partner::A),
    (Category::DirectImport, Partner::B),
    (Category::Domestic, Partner::A),
    (Category::Domestic, Partner::B),
];

/// Per-month table of partner totals, amounts to the cent.
fn write_summary_table<W: Write>(out: &mut W, reports: &[MonthlyReport]) -> std::io::Result<()> {
    let Some(first) = reports.first() else {
        return Ok(());
    };
    let width = reports
        .iter()
        .map(|r| r.month.chars().count())
        .max()
        .unwrap_or(0)
        .max("month".len());

    write!(out, "{:<width$}", "month")?;
    for (category, partner) in COLUMNS {
        let label = format!("{} {}", first.partner_name(partner), category.label());
        write!(out, "  {:>14}", label)?;
    }
    writeln!(out, "  {:>14}", "grand total")?;

    for report in reports {
        write!(out, "{:<width$}", report.month)?;
        for (category, partner) in COLUMNS {
            write!(out, "  {:>14.2}", report.actual.get(category, partner))?;
        }
        writeln!(out, "  {:>14.2}", report.actual.grand_total)?;
    }
    Ok(())
}
