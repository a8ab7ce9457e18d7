//! Accounting-month keys and DI month inference.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::ReconConfig;
use crate::dates;
use crate::header::HeaderIndex;
use crate::sheet::{cell_at, Workbook};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

// ---------------------------------------------------------------------------
// MonthKey
// ---------------------------------------------------------------------------

/// `year * 100 + month`. Orders chronologically; `0` means "unknown month".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MonthKey(u32);

impl MonthKey {
    pub const UNKNOWN: MonthKey = MonthKey(0);

    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(MonthKey(year as u32 * 100 + month))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        // chrono years in practice stay within 1..=9999 for spreadsheet dates
        MonthKey::new(date.year(), date.month()).unwrap_or(MonthKey::UNKNOWN)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    pub fn year(self) -> Option<i32> {
        (!self.is_unknown()).then_some((self.0 / 100) as i32)
    }

    pub fn month(self) -> Option<u32> {
        (!self.is_unknown()).then_some(self.0 % 100)
    }

    /// "October 2024"; `None` for the unknown key.
    pub fn display_name(self) -> Option<String> {
        let (year, month) = (self.year()?, self.month()?);
        Some(format!("{} {year}", MONTH_NAMES[month as usize - 1]))
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

/// How a DI month was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthSource {
    SheetDates,
    Filename,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthInference {
    pub display_name: String,
    pub month_key: MonthKey,
    pub source: MonthSource,
}

/// Decide which accounting month a DI workbook covers.
///
/// Order: majority vote over dates in the DI sheet, then month/year tokens
/// in `filename`, then the unknown sentinel labelled with the filename.
pub fn infer_month(workbook: &Workbook, filename: &str, config: &ReconConfig) -> MonthInference {
    if let Some(key) = month_from_sheet_dates(workbook, config) {
        debug!(file = filename, month = %key, "month inferred from sheet dates");
        return known(key, MonthSource::SheetDates);
    }
    if let Some(key) = month_from_filename(filename) {
        debug!(file = filename, month = %key, "month inferred from filename");
        return known(key, MonthSource::Filename);
    }
    debug!(file = filename, "month unknown");
    MonthInference {
        display_name: filename.to_string(),
        month_key: MonthKey::UNKNOWN,
        source: MonthSource::Unknown,
    }
}

fn known(key: MonthKey, source: MonthSource) -> MonthInference {
    MonthInference {
        display_name: key.display_name().unwrap_or_default(),
        month_key: key,
        source,
    }
}

/// Payment-date column first, discount-start column second; the first
/// column that yields any parseable date decides.
fn month_from_sheet_dates(workbook: &Workbook, config: &ReconConfig) -> Option<MonthKey> {
    let sheet = workbook.sheet_named(&config.direct.sheet_names)?;
    let index = HeaderIndex::new(sheet.header());
    let cols = &config.direct.columns;

    [&cols.payment_date, &cols.discount_start_date]
        .into_iter()
        .filter_map(|aliases| index.resolve(aliases))
        .find_map(|col| {
            majority_month(
                sheet
                    .data_rows()
                    .iter()
                    .filter_map(|row| dates::normalize(cell_at(row, col))),
            )
        })
}

/// Most frequent month among `dates`. Ties go to the month seen first.
pub fn majority_month(dates: impl IntoIterator<Item = NaiveDate>) -> Option<MonthKey> {
    let mut tally: Vec<(MonthKey, usize)> = Vec::new();
    for date in dates {
        let key = MonthKey::from_date(date);
        match tally.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => tally.push((key, 1)),
        }
    }
    tally
        .into_iter()
        .fold(None, |best: Option<(MonthKey, usize)>, (key, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((key, count)),
        })
        .map(|(key, _)| key)
}

fn month_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:^|[^a-z])(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)(?:[^a-z]|$)",
        )
        .expect("month token pattern is valid")
    })
}

fn year_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9])((?:19|20)[0-9]{2})(?:[^0-9]|$)")
            .expect("year token pattern is valid")
    })
}

/// Month + year tokens from a filename such as `"JPM Oct-Nov 2024.xlsx"`.
/// When two months are named, the first one wins.
pub fn month_from_filename(filename: &str) -> Option<MonthKey> {
    let token = month_token_re().captures(filename)?.get(1)?.as_str();
    let abbrev = token.get(..3)?.to_ascii_lowercase();
    let month = MONTH_NAMES
        .iter()
        .position(|name| name[..3].eq_ignore_ascii_case(&abbrev))?
        + 1;
    let year: i32 = year_token_re().captures(filename)?.get(1)?.as_str().parse().ok()?;
    MonthKey::new(year, month as u32)
}
