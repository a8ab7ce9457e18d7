//! Best-effort date normalization for heterogeneous spreadsheet cells.
//!
//! Every entry point returns `Option`: `None` means "no date available" and
//! is never an error.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};

use crate::sheet::Cell;

/// Largest serial Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Textual date layouts tried in order. US month-first wins over day-first
/// for ambiguous numeric forms. Four-digit layouts come first; a two-digit
/// year read through `%Y` is rejected by [`plausible`].
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Convert a cell into a calendar date, if it encodes one.
pub fn normalize(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(dt) => Some(dt.date()),
        Cell::Number(n) => from_excel_serial(*n),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Excel 1900 date system: whole days since 1899-12-30, time of day in the
/// fractional part (ignored). Serials below 60 sit before Excel's phantom
/// 1900-02-29 and are shifted by one day; serial 60 itself is that phantom.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.trunc() as u64;
    let epoch = match days {
        60 => return None,
        d if d < 60 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_days(Days::new(days))
}

/// Full serial (date + time-of-day fraction) to a timestamp.
pub fn datetime_from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    let date = from_excel_serial(serial)?;
    let secs = ((serial.fract() * 86_400.0).round() as u32).min(86_399);
    date.and_hms_opt(secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Parse a textual date in any of the common spreadsheet renderings.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .filter_map(|f| NaiveDateTime::parse_from_str(s, f).ok().map(|dt| dt.date()))
        .find(plausible)
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .filter_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .find(plausible)
        })
}

fn plausible(date: &NaiveDate) -> bool {
    date.year() >= 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_known_values() {
        assert_eq!(from_excel_serial(1.0), Some(ymd(1900, 1, 1)));
        assert_eq!(from_excel_serial(59.0), Some(ymd(1900, 2, 28)));
        assert_eq!(from_excel_serial(60.0), None);
        assert_eq!(from_excel_serial(61.0), Some(ymd(1900, 3, 1)));
        assert_eq!(from_excel_serial(45292.0), Some(ymd(2024, 1, 1)));
        assert_eq!(from_excel_serial(45566.0), Some(ymd(2024, 10, 1)));
    }

    #[test]
    fn serial_time_fraction_ignored() {
        assert_eq!(from_excel_serial(45292.75), Some(ymd(2024, 1, 1)));
        let dt = datetime_from_excel_serial(45292.5).unwrap();
        assert_eq!(dt, ymd(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn serial_out_of_range() {
        assert_eq!(from_excel_serial(0.0), None);
        assert_eq!(from_excel_serial(-5.0), None);
        assert_eq!(from_excel_serial(f64::NAN), None);
        assert_eq!(from_excel_serial(3_000_000.0), None);
    }

    #[test]
    fn text_formats() {
        assert_eq!(parse_date_text("2024-10-03"), Some(ymd(2024, 10, 3)));
        assert_eq!(parse_date_text("10/03/2024"), Some(ymd(2024, 10, 3)));
        assert_eq!(parse_date_text("10/3/24"), Some(ymd(2024, 10, 3)));
        assert_eq!(parse_date_text("3-Oct-2024"), Some(ymd(2024, 10, 3)));
        assert_eq!(parse_date_text("October 3, 2024"), Some(ymd(2024, 10, 3)));
        assert_eq!(parse_date_text(" 2024-10-03 14:30:00 "), Some(ymd(2024, 10, 3)));
        assert_eq!(parse_date_text("2024-10-03T14:30:00Z"), Some(ymd(2024, 10, 3)));
    }

    #[test]
    fn unparseable_text_is_none() {
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("pending"), None);
        assert_eq!(parse_date_text("13/45/2024"), None);
    }

    #[test]
    fn normalize_dispatches_on_cell_type() {
        let dt = ymd(2024, 2, 9).and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(normalize(&Cell::Date(dt)), Some(ymd(2024, 2, 9)));
        assert_eq!(normalize(&Cell::Number(45292.0)), Some(ymd(2024, 1, 1)));
        assert_eq!(normalize(&Cell::from("2024-01-01")), Some(ymd(2024, 1, 1)));
        assert_eq!(normalize(&Cell::Bool(true)), None);
        assert_eq!(normalize(&Cell::Empty), None);
    }
}
