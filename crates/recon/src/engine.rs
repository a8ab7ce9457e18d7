use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::{build_report, ReportSources};
use crate::classify::{classify, SourceKind};
use crate::config::ReconConfig;
use crate::direct::extract_direct;
use crate::domestic::extract_domestic;
use crate::error::ReconError;
use crate::model::{MonthlyReport, RevenueRow, SkipCounts};
use crate::month::{infer_month, MonthKey};
use crate::sheet::Workbook;

/// A parsed upload and the name it arrived under.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: String,
    pub workbook: Workbook,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, workbook: Workbook) -> Self {
        Self {
            filename: filename.into(),
            workbook,
        }
    }
}

/// An upload left out of the run, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected {
    pub filename: String,
    pub reason: String,
}

/// Uploads sorted by source kind.
#[derive(Debug, Default)]
pub struct Batch {
    /// DI workbooks in upload order.
    pub direct: Vec<SourceFile>,
    pub domestic: Option<SourceFile>,
    pub rejected: Vec<Rejected>,
}

/// Classify every upload and route it. Unrecognized workbooks and any DO
/// ledger after the first are rejected without failing the batch.
pub fn route_uploads(files: Vec<SourceFile>, config: &ReconConfig) -> Batch {
    let mut batch = Batch::default();
    for file in files {
        let kind = classify(&file.workbook, config);
        debug!(file = %file.filename, %kind, "classified upload");
        match kind {
            SourceKind::DirectImport => batch.direct.push(file),
            SourceKind::Domestic if batch.domestic.is_none() => batch.domestic = Some(file),
            SourceKind::Domestic => {
                warn!(file = %file.filename, "additional DO ledger ignored");
                batch.rejected.push(Rejected {
                    filename: file.filename,
                    reason: "only one DO ledger is used per run".into(),
                });
            }
            SourceKind::Unrecognized => {
                warn!(file = %file.filename, "unrecognized workbook");
                batch.rejected.push(Rejected {
                    filename: file.filename,
                    reason: "no DI or DO sheet found".into(),
                });
            }
        }
    }
    batch
}

/// Build one report per DI file, joined with the DO rows of its month.
///
/// Any fatal extraction error aborts the whole run. Reports come back sorted
/// by month key, unknown month first, upload order within a month.
pub fn run_pipeline(
    direct_files: &[SourceFile],
    domestic_file: Option<&SourceFile>,
    config: &ReconConfig,
) -> Result<Vec<MonthlyReport>, ReconError> {
    if direct_files.is_empty() {
        return Err(ReconError::NoDirectImportFiles);
    }

    let mut direct = Vec::with_capacity(direct_files.len());
    for file in direct_files {
        let extraction = extract_direct(&file.workbook, &file.filename, config)?;
        let month = infer_month(&file.workbook, &file.filename, config);
        direct.push((file, extraction, month));
    }

    let (domestic_by_month, domestic_skipped) = match domestic_file {
        Some(file) => {
            let extraction = extract_domestic(&file.workbook, &file.filename, config)?;
            (rows_by_month(extraction.rows), extraction.skipped)
        }
        None => (BTreeMap::new(), SkipCounts::default()),
    };

    let mut reports = Vec::with_capacity(direct.len());
    for (file, extraction, month) in &direct {
        if extraction.rows.is_empty() {
            warn!(file = %file.filename, "DI file produced no usable rows");
            continue;
        }
        let domestic_rows = domestic_by_month
            .get(&month.month_key)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        reports.push(build_report(
            ReportSources {
                month,
                source_filename: &file.filename,
                direct: extraction,
                domestic_rows,
                domestic_skipped,
            },
            config,
        ));
    }

    if reports.is_empty() {
        return Err(ReconError::EmptyResult);
    }
    reports.sort_by_key(|r| r.month_key);
    Ok(reports)
}

/// Bucket dated DO rows by month. Undated rows never reach here.
fn rows_by_month(rows: Vec<RevenueRow>) -> BTreeMap<MonthKey, Vec<RevenueRow>> {
    let mut by_month: BTreeMap<MonthKey, Vec<RevenueRow>> = BTreeMap::new();
    for row in rows {
        let Some(date) = row.date else { continue };
        let key = MonthKey::from_date(date);
        if key.is_unknown() {
            continue;
        }
        by_month.entry(key).or_default().push(row);
    }
    by_month
}
