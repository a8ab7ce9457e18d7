// Excel workbook reading (xlsx, xlsm, xlsb, xls, ods) and report export (xlsx only)
//
// Reading: uploads are converted to the engine's in-memory grid once, then dropped.
// Export: presentation snapshot of the monthly reports. Not a round-trip format.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use tracing::{debug, warn};

use revsplit_recon::dates;
use revsplit_recon::model::{Category, Partner};
use revsplit_recon::{Cell, MonthlyReport, Sheet, Workbook};

use crate::error::IoError;

/// Maximum dimensions read from a sheet
const MAX_ROWS: usize = 65536;
const MAX_COLS: usize = 256;

/// Extensions accepted as spreadsheet uploads (compared lowercase)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// True when `filename` ends in a spreadsheet extension, case-insensitively.
pub fn is_supported_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read a workbook from a file on disk. The filename used for
/// classification and reporting is the path's final component.
pub fn read_workbook_file(path: &Path) -> Result<Workbook, IoError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    if !is_supported_extension(&filename) {
        return Err(IoError::UnsupportedFileType { file: filename });
    }
    let bytes = std::fs::read(path).map_err(|e| IoError::Open {
        file: filename.clone(),
        reason: e.to_string(),
    })?;
    read_workbook(&filename, bytes)
}

/// Parse uploaded bytes into a [`Workbook`].
///
/// The extension is checked before any parsing; the container format itself
/// is sniffed from the bytes.
pub fn read_workbook(filename: &str, bytes: Vec<u8>) -> Result<Workbook, IoError> {
    if !is_supported_extension(filename) {
        return Err(IoError::UnsupportedFileType {
            file: filename.to_string(),
        });
    }

    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| IoError::Open {
        file: filename.to_string(),
        reason: e.to_string(),
    })?;

    let sheet_names: Vec<String> = source.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::Open {
            file: filename.to_string(),
            reason: "workbook contains no sheets".to_string(),
        });
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = source.worksheet_range(sheet_name).map_err(|e| IoError::Sheet {
            file: filename.to_string(),
            sheet: sheet_name.clone(),
            reason: e.to_string(),
        })?;

        let (height, width) = range.get_size();
        if height == 0 || width == 0 {
            sheets.push(Sheet::new(sheet_name.as_str(), Vec::new()));
            continue;
        }

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let effective_rows = (start_row + height).min(MAX_ROWS);
        let effective_cols = (start_col + width).min(MAX_COLS);
        if start_row + height > MAX_ROWS || start_col + width > MAX_COLS {
            warn!(
                file = filename,
                sheet = %sheet_name,
                rows = start_row + height,
                cols = start_col + width,
                kept_rows = effective_rows,
                kept_cols = effective_cols,
                "sheet truncated"
            );
        }

        let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); start_row.min(effective_rows)];
        for row in range.rows() {
            if grid.len() >= effective_rows {
                break;
            }
            let mut cells = vec![Cell::Empty; start_col.min(effective_cols)];
            cells.extend(
                row.iter()
                    .take(effective_cols.saturating_sub(start_col))
                    .map(convert_cell),
            );
            grid.push(cells);
        }

        debug!(file = filename, sheet = %sheet_name, rows = grid.len(), "read sheet");
        sheets.push(Sheet::new(sheet_name.as_str(), grid));
    }

    Ok(Workbook::new(sheets))
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(e.to_string()),
        Data::DateTime(dt) => {
            // 1900 date system assumed; calamine does not expose the 1904 flag
            let serial = dt.as_f64();
            match dates::datetime_from_excel_serial(serial) {
                Some(value) => Cell::Date(value),
                None => Cell::Number(serial),
            }
        }
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| dates::parse_date_text(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

// -------------------------------------------------------------------------
// Export
// -------------------------------------------------------------------------

const AMOUNT_FORMAT: &str = "#,##0.00";

/// Render reports as an xlsx workbook with a "Summary" and a "Detail" sheet.
///
/// Summary amounts are rounded to cents; Detail amounts are written at full
/// precision. Partner names are taken from the first report.
pub fn to_spreadsheet(reports: &[MonthlyReport]) -> Result<Vec<u8>, IoError> {
    let mut xlsx_workbook = XlsxWorkbook::new();

    let summary = xlsx_workbook.add_worksheet().set_name("Summary")?;
    write_summary(summary, reports)?;

    let detail = xlsx_workbook.add_worksheet().set_name("Detail")?;
    write_detail(detail, reports)?;

    let bytes = xlsx_workbook.save_to_buffer()?;
    debug!(reports = reports.len(), bytes = bytes.len(), "spreadsheet export");
    Ok(bytes)
}

/// Summary column order after "Month".
const SUMMARY_COLUMNS: [(Category, Partner); 4] = [
    (Category::DirectImport, Partner::A),
    (Category::DirectImport, Partner::B),
    (Category::Domestic, Partner::A),
    (Category::Domestic, Partner::B),
];

fn write_summary(worksheet: &mut Worksheet, reports: &[MonthlyReport]) -> Result<(), IoError> {
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format(AMOUNT_FORMAT);
    let money_bold = Format::new().set_bold().set_num_format(AMOUNT_FORMAT);

    let partners = reports
        .first()
        .map(|r| r.partners.clone())
        .unwrap_or_default();

    worksheet.write_string_with_format(0, 0, "Month", &bold)?;
    for (i, (category, partner)) in SUMMARY_COLUMNS.iter().enumerate() {
        let label = format!("{} {}", partners[partner.index()], category.label());
        worksheet.write_string_with_format(0, (i + 1) as u16, label.trim(), &bold)?;
    }
    worksheet.write_string_with_format(0, 5, "Grand Total", &bold)?;

    let mut totals = [0.0f64; 5];
    for (i, report) in reports.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &report.month)?;
        for (j, (category, partner)) in SUMMARY_COLUMNS.iter().enumerate() {
            let value = report.actual.get(*category, *partner);
            totals[j] += value;
            worksheet.write_number_with_format(row, (j + 1) as u16, round_cents(value), &money)?;
        }
        totals[4] += report.actual.grand_total;
        worksheet.write_number_with_format(row, 5, round_cents(report.actual.grand_total), &money)?;
    }

    if reports.len() > 1 {
        let row = (reports.len() + 1) as u32;
        worksheet.write_string_with_format(row, 0, "Total", &bold)?;
        for (j, total) in totals.iter().enumerate() {
            worksheet.write_number_with_format(row, (j + 1) as u16, round_cents(*total), &money_bold)?;
        }
    }

    worksheet.set_column_width(0, 20)?;
    for col in 1..=5u16 {
        worksheet.set_column_width(col, 16)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_detail(worksheet: &mut Worksheet, reports: &[MonthlyReport]) -> Result<(), IoError> {
    let bold = Format::new().set_bold();
    for (col, label) in ["Month", "Category", "Team", "Program", "Amount"].iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *label, &bold)?;
    }

    let mut row = 1u32;
    for report in reports {
        for category in Category::ALL {
            for partner in Partner::ALL {
                let team = report.partner_name(partner);
                for (program, amount) in report.partner_programs(category, partner) {
                    worksheet.write_string(row, 0, &report.month)?;
                    worksheet.write_string(row, 1, category.label())?;
                    worksheet.write_string(row, 2, team)?;
                    worksheet.write_string(row, 3, program)?;
                    worksheet.write_number(row, 4, amount)?;
                    row += 1;
                }
            }
        }
    }

    worksheet.set_column_width(0, 20)?;
    worksheet.set_column_width(2, 16)?;
    worksheet.set_column_width(3, 24)?;
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use revsplit_recon::{run_pipeline, ReconConfig, SourceFile};

    fn build_xlsx(fill: impl FnOnce(&mut XlsxWorkbook)) -> Vec<u8> {
        let mut workbook = XlsxWorkbook::new();
        fill(&mut workbook);
        workbook.save_to_buffer().unwrap()
    }

    fn sample_reports() -> Vec<MonthlyReport> {
        let di = |filename: &str, rows: Vec<(&str, &str, f64)>| {
            let mut grid = vec![vec![
                Cell::from("Team"),
                Cell::from("Program"),
                Cell::from("Paid Per Item"),
            ]];
            for (team, program, amount) in rows {
                grid.push(vec![Cell::from(team), Cell::from(program), Cell::Number(amount)]);
            }
            SourceFile::new(filename, Workbook::new(vec![Sheet::new("Payment Detail", grid)]))
        };
        let files = vec![
            di(
                "Oct 2024.xlsx",
                vec![("Blackfin", "Gold", 10.004), ("Meridian", "Gold", 5.0), ("Outsider", "Gold", 99.0)],
            ),
            di("Nov 2024.xlsx", vec![("Blackfin", "Silver", 2.5)]),
        ];
        run_pipeline(&files, None, &ReconConfig::default()).unwrap()
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("October 2024.xlsx"));
        assert!(is_supported_extension("LEDGER.XLSM"));
        assert!(is_supported_extension("a.b.ods"));
        assert!(is_supported_extension("old.xls"));
        assert!(!is_supported_extension("notes.txt"));
        assert!(!is_supported_extension("export.csv"));
        assert!(!is_supported_extension("xlsx"));
    }

    #[test]
    fn test_rejects_extension_before_parsing() {
        let bytes = build_xlsx(|wb| {
            wb.add_worksheet().write_string(0, 0, "Team").unwrap();
        });
        let err = read_workbook("payments.txt", bytes).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFileType { ref file } if file == "payments.txt"));
    }

    #[test]
    fn test_garbage_bytes_fail_to_open() {
        let err = read_workbook("broken.xlsx", b"not a spreadsheet".to_vec()).unwrap_err();
        assert!(matches!(err, IoError::Open { .. }));
    }

    #[test]
    fn test_read_cells() {
        let bytes = build_xlsx(|wb| {
            let ws = wb.add_worksheet().set_name("Payment Detail").unwrap();
            ws.write_string(0, 0, "Team").unwrap();
            ws.write_string(0, 1, "Paid Per Item").unwrap();
            ws.write_string(0, 2, "Payment Date").unwrap();
            ws.write_string(0, 3, "Settled").unwrap();
            ws.write_string(1, 0, "Blackfin").unwrap();
            ws.write_number(1, 1, 150.5).unwrap();
            let date_format = Format::new().set_num_format("yyyy-mm-dd");
            ws.write_number_with_format(1, 2, 45580.0, &date_format).unwrap();
            ws.write_boolean(1, 3, true).unwrap();
        });

        let workbook = read_workbook("Oct 2024.xlsx", bytes).unwrap();
        assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Payment Detail"]);
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.cell(0, 0), &Cell::from("Team"));
        assert_eq!(sheet.cell(1, 0), &Cell::from("Blackfin"));
        assert_eq!(sheet.cell(1, 1), &Cell::Number(150.5));
        assert_eq!(sheet.cell(1, 3), &Cell::Bool(true));
        assert_eq!(
            dates::normalize(sheet.cell(1, 2)),
            NaiveDate::from_ymd_opt(2024, 10, 15)
        );
    }

    #[test]
    fn test_range_offset_preserved() {
        let bytes = build_xlsx(|wb| {
            let ws = wb.add_worksheet().set_name("Domestic 2024").unwrap();
            ws.write_string(2, 1, "Blackfin").unwrap();
            ws.write_number(3, 2, 7.0).unwrap();
        });
        let workbook = read_workbook("ledger.xlsx", bytes).unwrap();
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.cell(2, 1), &Cell::from("Blackfin"));
        assert_eq!(sheet.cell(3, 2), &Cell::Number(7.0));
        assert!(sheet.cell(0, 0).is_empty());
        assert!(sheet.rows[1].is_empty());
    }

    #[test]
    fn test_empty_sheet_kept() {
        let bytes = build_xlsx(|wb| {
            wb.add_worksheet().set_name("Cover").unwrap();
            wb.add_worksheet()
                .set_name("Payments Detail")
                .unwrap()
                .write_string(0, 0, "Team")
                .unwrap();
        });
        let workbook = read_workbook("nov.xlsx", bytes).unwrap();
        assert_eq!(workbook.sheets.len(), 2);
        assert!(workbook.sheets[0].rows.is_empty());
    }

    #[test]
    fn test_read_workbook_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Oct 2024.XLSX");
        let bytes = build_xlsx(|wb| {
            wb.add_worksheet().write_string(0, 0, "hello").unwrap();
        });
        std::fs::write(&path, bytes).unwrap();
        let workbook = read_workbook_file(&path).unwrap();
        assert_eq!(workbook.sheets[0].cell(0, 0), &Cell::from("hello"));

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "x").unwrap();
        assert!(matches!(
            read_workbook_file(&txt),
            Err(IoError::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn test_iso_datetime_text() {
        assert_eq!(
            parse_iso_datetime("2024-10-15T08:30:00").map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 10, 15)
        );
        assert_eq!(
            parse_iso_datetime("2024-10-15").map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 10, 15)
        );
        assert!(parse_iso_datetime("PT1H").is_none());
    }

    #[test]
    fn test_spreadsheet_export_reads_back() {
        let reports = sample_reports();
        let bytes = to_spreadsheet(&reports).unwrap();
        let workbook = read_workbook("report.xlsx", bytes).unwrap();

        assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Summary", "Detail"]);

        let summary = &workbook.sheets[0];
        let header: Vec<_> = summary.rows[0].iter().filter_map(Cell::as_text).collect();
        assert_eq!(
            header,
            vec!["Month", "Blackfin DI", "Meridian DI", "Blackfin DO", "Meridian DO", "Grand Total"]
        );
        // sorted: October first
        assert_eq!(summary.cell(1, 0), &Cell::from("October 2024"));
        assert_eq!(summary.cell(1, 1), &Cell::Number(10.0));
        assert_eq!(summary.cell(1, 2), &Cell::Number(5.0));
        assert_eq!(summary.cell(1, 5), &Cell::Number(15.0));
        assert_eq!(summary.cell(3, 0), &Cell::from("Total"));
        assert_eq!(summary.cell(3, 5), &Cell::Number(17.5));

        let detail = &workbook.sheets[1];
        assert_eq!(detail.cell(0, 4), &Cell::from("Amount"));
        // partner rows only, unrounded
        assert_eq!(detail.rows.len(), 4);
        assert_eq!(detail.cell(1, 2), &Cell::from("Blackfin"));
        assert_eq!(detail.cell(1, 4), &Cell::Number(10.004));
        assert_eq!(detail.cell(3, 0), &Cell::from("November 2024"));
        assert_eq!(detail.cell(3, 3), &Cell::from("Silver"));
    }

    #[test]
    fn test_single_month_has_no_total_row() {
        let reports = sample_reports();
        let bytes = to_spreadsheet(&reports[..1]).unwrap();
        let workbook = read_workbook("report.xlsx", bytes).unwrap();
        assert_eq!(workbook.sheets[0].rows.len(), 2);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(10.004), 10.0);
        assert_eq!(round_cents(2.675_1), 2.68);
        assert_eq!(round_cents(-1.005_1), -1.01);
    }
}
