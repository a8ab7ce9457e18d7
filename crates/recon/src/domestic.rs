//! Domestic (DO) ledger extractor.
//!
//! The ledger has many empty trailing columns and no dependable header, so
//! columns are addressed by position through [`DomesticColumns`]. Dates are
//! written once per block of rows and filled down to the rows below.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::config::ReconConfig;
use crate::dates;
use crate::error::ReconError;
use crate::model::{Extraction, RevenueRow};
use crate::sheet::{cell_at, is_blank_row, Cell, Sheet, Workbook};

/// Fixed column positions of the DO ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomesticColumns {
    pub date: usize,
    pub team: usize,
    pub program: usize,
    pub amount: usize,
}

pub const DEFAULT_DOMESTIC_COLUMNS: DomesticColumns = DomesticColumns {
    date: 0,
    team: 1,
    program: 2,
    amount: 5,
};

impl Default for DomesticColumns {
    fn default() -> Self {
        DEFAULT_DOMESTIC_COLUMNS
    }
}

/// Pick the DO sheet: one naming both the marker and the reporting year if
/// any, else the first naming the marker.
pub fn select_domestic_sheet<'a>(workbook: &'a Workbook, marker: &str, year: i32) -> Option<&'a Sheet> {
    let year = year.to_string();
    let mut candidates = workbook.sheets.iter().filter(|s| s.name.contains(marker));
    let first = candidates.clone().next();
    candidates.find(|s| s.name.contains(&year)).or(first)
}

/// Extract dated (team, program, amount) rows from the DO ledger.
pub fn extract_domestic(
    workbook: &Workbook,
    source_label: &str,
    config: &ReconConfig,
) -> Result<Extraction, ReconError> {
    let marker = config.domestic.marker.as_str();
    let year = config.reporting_year();
    let sheet = select_domestic_sheet(workbook, marker, year).ok_or_else(|| {
        ReconError::NoDomesticSheet {
            file: source_label.to_string(),
            marker: marker.to_string(),
        }
    })?;

    let out = fill_down_rows(
        sheet.data_rows(),
        config.domestic.columns,
        config.domestic.max_columns,
    );

    debug!(
        file = source_label,
        sheet = %sheet.name,
        year,
        rows = out.rows.len(),
        no_date = out.skipped.no_date,
        no_team = out.skipped.no_team,
        no_amount = out.skipped.no_amount,
        "extracted DO rows"
    );
    Ok(out)
}

/// Sequential fold over ledger rows carrying the last seen date.
pub fn fill_down_rows(rows: &[Vec<Cell>], cols: DomesticColumns, max_columns: usize) -> Extraction {
    rows.iter()
        .fold(FillDown::default(), |state, row| {
            let bounded = &row[..row.len().min(max_columns)];
            state.step(bounded, cols)
        })
        .out
}

#[derive(Default)]
struct FillDown {
    last_date: Option<NaiveDate>,
    out: Extraction,
}

impl FillDown {
    fn step(mut self, row: &[Cell], cols: DomesticColumns) -> Self {
        if is_blank_row(row) {
            return self;
        }
        let date = dates::normalize(cell_at(row, cols.date)).or(self.last_date);
        self.last_date = date;

        let Some(date) = date else {
            self.out.skipped.no_date += 1;
            return self;
        };
        let Some(team) = cell_at(row, cols.team).as_text() else {
            self.out.skipped.no_team += 1;
            return self;
        };
        let Some(amount) = cell_at(row, cols.amount).as_number() else {
            self.out.skipped.no_amount += 1;
            return self;
        };
        let program = cell_at(row, cols.program).as_text();
        self.out
            .rows
            .push(RevenueRow::new(team, program, amount, Some(date)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UNKNOWN_PROGRAM;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Ledger row in the default layout: date, team, program, _, _, amount.
    fn ledger(date: Cell, team: &str, program: &str, amount: Cell) -> Vec<Cell> {
        let opt = |s: &str| if s.is_empty() { Cell::Empty } else { Cell::from(s) };
        vec![date, opt(team), opt(program), Cell::Empty, Cell::Empty, amount]
    }

    fn config_for(year: i32) -> ReconConfig {
        let mut config = ReconConfig::default();
        config.domestic.reporting_year = Some(year);
        config
    }

    fn workbook(sheets: Vec<(&str, Vec<Vec<Cell>>)>) -> Workbook {
        Workbook::new(
            sheets
                .into_iter()
                .map(|(name, rows)| Sheet::new(name, rows))
                .collect(),
        )
    }

    fn header() -> Vec<Cell> {
        ["Date", "Team", "Program", "Memo", "Gross", "Paid"]
            .iter()
            .map(|h| Cell::from(*h))
            .collect()
    }

    #[test]
    fn fill_down_carries_last_date() {
        let rows = vec![
            ledger(Cell::from("2024-01-05"), "Blackfin", "Gold", Cell::Number(10.0)),
            ledger(Cell::Empty, "Blackfin", "Silver", Cell::Number(20.0)),
            ledger(Cell::Empty, "Meridian", "Gold", Cell::Number(30.0)),
            ledger(Cell::from("2024-02-01"), "Meridian", "Gold", Cell::Number(40.0)),
        ];
        let out = fill_down_rows(&rows, DEFAULT_DOMESTIC_COLUMNS, 16);
        let got: Vec<_> = out.rows.iter().map(|r| r.date).collect();
        assert_eq!(
            got,
            vec![
                Some(ymd(2024, 1, 5)),
                Some(ymd(2024, 1, 5)),
                Some(ymd(2024, 1, 5)),
                Some(ymd(2024, 2, 1)),
            ]
        );
    }

    #[test]
    fn rows_before_first_date_dropped() {
        let rows = vec![
            ledger(Cell::Empty, "Blackfin", "Gold", Cell::Number(10.0)),
            ledger(Cell::Number(45292.0), "Blackfin", "Gold", Cell::Number(20.0)),
        ];
        let out = fill_down_rows(&rows, DEFAULT_DOMESTIC_COLUMNS, 16);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].date, Some(ymd(2024, 1, 1)));
        assert_eq!(out.skipped.no_date, 1);
    }

    #[test]
    fn unparseable_date_keeps_previous() {
        let rows = vec![
            ledger(Cell::from("2024-03-10"), "Blackfin", "Gold", Cell::Number(1.0)),
            ledger(Cell::from("see above"), "Blackfin", "Gold", Cell::Number(2.0)),
        ];
        let out = fill_down_rows(&rows, DEFAULT_DOMESTIC_COLUMNS, 16);
        assert_eq!(out.rows[1].date, Some(ymd(2024, 3, 10)));
    }

    #[test]
    fn skip_reasons_counted() {
        let rows = vec![
            ledger(Cell::from("2024-03-10"), "", "Gold", Cell::Number(1.0)),
            ledger(Cell::Empty, "Blackfin", "Gold", Cell::Empty),
            ledger(Cell::Empty, "Blackfin", "Gold", Cell::from("void")),
            ledger(Cell::Empty, "Blackfin", "Gold", Cell::Number(3.0)),
            vec![Cell::Empty; 8],
        ];
        let out = fill_down_rows(&rows, DEFAULT_DOMESTIC_COLUMNS, 16);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.skipped.no_team, 1);
        assert_eq!(out.skipped.no_amount, 2);
        assert_eq!(out.skipped.no_date, 0);
    }

    #[test]
    fn blank_program_is_unknown() {
        let rows = vec![ledger(Cell::from("2024-03-10"), "Blackfin", "", Cell::Number(200.0))];
        let out = fill_down_rows(&rows, DEFAULT_DOMESTIC_COLUMNS, 16);
        assert_eq!(out.rows[0].team, "Blackfin");
        assert_eq!(out.rows[0].program, UNKNOWN_PROGRAM);
        assert_eq!(out.rows[0].amount, 200.0);
    }

    #[test]
    fn column_cap_bounds_reads() {
        let cols = DomesticColumns { date: 0, team: 1, program: 2, amount: 5 };
        let rows = vec![ledger(Cell::from("2024-03-10"), "Blackfin", "Gold", Cell::Number(5.0))];
        // amount sits at index 5, outside a 5-column window
        let out = fill_down_rows(&rows, cols, 5);
        assert!(out.rows.is_empty());
        assert_eq!(out.skipped.no_amount, 1);
    }

    #[test]
    fn prefers_year_qualified_sheet() {
        let wb = workbook(vec![
            ("Domestic 2023", vec![]),
            ("Domestic 2024", vec![]),
            ("Notes", vec![]),
        ]);
        let picked = select_domestic_sheet(&wb, "Domestic", 2024).unwrap();
        assert_eq!(picked.name, "Domestic 2024");
        let fallback = select_domestic_sheet(&wb, "Domestic", 2030).unwrap();
        assert_eq!(fallback.name, "Domestic 2023");
        assert!(select_domestic_sheet(&wb, "Intl", 2024).is_none());
    }

    #[test]
    fn extract_skips_header_and_reads_selected_sheet() {
        let wb = workbook(vec![
            (
                "Domestic 2023",
                vec![header(), ledger(Cell::from("2023-12-01"), "Blackfin", "Gold", Cell::Number(1.0))],
            ),
            (
                "2024 Domestic Payments",
                vec![
                    header(),
                    ledger(Cell::from("2024-01-02"), "Blackfin", "Gold", Cell::Number(5.0)),
                    ledger(Cell::Empty, "Meridian", "", Cell::Number(6.0)),
                ],
            ),
        ]);
        let out = extract_domestic(&wb, "ledger.xlsx", &config_for(2024)).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert!(out.rows.iter().all(|r| r.date == Some(ymd(2024, 1, 2))));
    }

    #[test]
    fn missing_domestic_sheet_is_fatal() {
        let wb = workbook(vec![("Sheet1", vec![header()])]);
        let err = extract_domestic(&wb, "ledger.xlsx", &config_for(2024)).unwrap_err();
        assert!(matches!(err, ReconError::NoDomesticSheet { .. }));
    }
}
