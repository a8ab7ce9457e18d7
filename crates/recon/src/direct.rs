//! Direct Import (DI) extractor.

use tracing::{debug, trace};

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::header::HeaderIndex;
use crate::model::{Extraction, RevenueRow};
use crate::sheet::{cell_at, is_blank_row, Cell, Workbook};

/// Extract (team, program, amount) rows from the DI sheet of `workbook`.
///
/// Fails when the DI sheet is absent, has no data row, or has no team
/// column. Rows without a team or a usable amount are skipped and counted.
pub fn extract_direct(
    workbook: &Workbook,
    source_label: &str,
    config: &ReconConfig,
) -> Result<Extraction, ReconError> {
    let names = &config.direct.sheet_names;
    let sheet = workbook
        .sheet_named(names)
        .ok_or_else(|| ReconError::MissingSheet {
            file: source_label.to_string(),
            sheet: names.join(" | "),
        })?;
    if sheet.rows.len() < 2 {
        return Err(ReconError::EmptySheet {
            file: source_label.to_string(),
            sheet: sheet.name.clone(),
        });
    }

    let index = HeaderIndex::new(sheet.header());
    let cols = &config.direct.columns;
    let team_col = index.resolve(&cols.team).ok_or_else(|| ReconError::MissingColumn {
        file: source_label.to_string(),
        column: cols.team.first().cloned().unwrap_or_default(),
    })?;
    let program_col = index.resolve(&cols.program);
    let paid_col = index.resolve(&cols.paid_per_item);
    let net_col = index.resolve(&cols.net_amount);
    if paid_col.is_none() && net_col.is_none() {
        debug!(file = source_label, "no amount column resolved; every row will be skipped");
    }

    let mut out = Extraction::default();
    for (i, row) in sheet.data_rows().iter().enumerate() {
        if is_blank_row(row) {
            continue;
        }
        let Some(team) = cell_at(row, team_col).as_text() else {
            if looks_like_label_row(row) {
                trace!(file = source_label, row = i + 1, "label row without team");
            }
            out.skipped.no_team += 1;
            continue;
        };
        let Some(amount) = direct_amount(row, paid_col, net_col) else {
            out.skipped.no_amount += 1;
            continue;
        };
        let program = program_col.and_then(|c| cell_at(row, c).as_text());
        out.rows.push(RevenueRow::new(team, program, amount, None));
    }

    debug!(
        file = source_label,
        sheet = %sheet.name,
        rows = out.rows.len(),
        no_team = out.skipped.no_team,
        no_amount = out.skipped.no_amount,
        "extracted DI rows"
    );
    Ok(out)
}

/// Paid-per-item cell when present, else the net-amount cell. A present but
/// non-numeric paid cell does not fall back.
fn direct_amount(row: &[Cell], paid_col: Option<usize>, net_col: Option<usize>) -> Option<f64> {
    let paid = paid_col.map(|c| cell_at(row, c)).filter(|c| !c.is_empty());
    let net = net_col.map(|c| cell_at(row, c));
    paid.or(net)?.as_number()
}

/// Subtotal and caption rows typically carry a "total" label somewhere.
fn looks_like_label_row(row: &[Cell]) -> bool {
    row.iter()
        .filter_map(Cell::as_text)
        .any(|t| t.to_lowercase().contains("total"))
}
