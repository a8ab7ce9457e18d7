use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::month::MonthKey;

/// Program label used when a row leaves the program cell blank.
pub const UNKNOWN_PROGRAM: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// One revenue line pulled from a DI or DO sheet.
///
/// `amount` is always finite. `date` is set for DO rows only.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRow {
    pub team: String,
    pub program: String,
    pub amount: f64,
    pub date: Option<NaiveDate>,
}

impl RevenueRow {
    /// Build a row, substituting [`UNKNOWN_PROGRAM`] for a missing program.
    pub fn new(team: String, program: Option<String>, amount: f64, date: Option<NaiveDate>) -> Self {
        Self {
            team,
            program: program.unwrap_or_else(|| UNKNOWN_PROGRAM.to_string()),
            amount,
            date,
        }
    }
}

/// Rows dropped during extraction, by the first rule they failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub no_date: usize,
    pub no_team: usize,
    pub no_amount: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.no_date + self.no_team + self.no_amount
    }
}

/// Result of one extractor call: kept rows plus skip diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub rows: Vec<RevenueRow>,
    pub skipped: SkipCounts,
}

// ---------------------------------------------------------------------------
// Partners + categories
// ---------------------------------------------------------------------------

/// Slot of a named partner in the configured partner pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Partner {
    A,
    B,
}

impl Partner {
    pub const ALL: [Partner; 2] = [Partner::A, Partner::B];

    pub fn index(self) -> usize {
        match self {
            Partner::A => 0,
            Partner::B => 1,
        }
    }
}

/// Revenue source a figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "DI")]
    DirectImport,
    #[serde(rename = "DO")]
    Domestic,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::DirectImport, Category::Domestic];

    pub fn label(self) -> &'static str {
        match self {
            Category::DirectImport => "DI",
            Category::Domestic => "DO",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// team → program → summed amount.
pub type TeamProgramTotals = BTreeMap<String, BTreeMap<String, f64>>;

/// Partner-scoped summary figures. Only the two named partners contribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ActualTotals {
    pub di_partner_a: f64,
    pub di_partner_b: f64,
    pub di_total: f64,
    pub do_partner_a: f64,
    pub do_partner_b: f64,
    pub do_total: f64,
    pub grand_total: f64,
}

impl ActualTotals {
    pub fn get(&self, category: Category, partner: Partner) -> f64 {
        match (category, partner) {
            (Category::DirectImport, Partner::A) => self.di_partner_a,
            (Category::DirectImport, Partner::B) => self.di_partner_b,
            (Category::Domestic, Partner::A) => self.do_partner_a,
            (Category::Domestic, Partner::B) => self.do_partner_b,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub di_rows: usize,
    pub do_rows: usize,
    pub di_skipped: SkipCounts,
    pub do_skipped: SkipCounts,
}

/// One report per DI file: that file's month, its DI figures, and the DO
/// figures dated in the same month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub month: String,
    pub month_key: MonthKey,
    pub source_filename: String,
    /// Partner names in slot order (A, B).
    pub partners: [String; 2],
    pub actual: ActualTotals,
    /// Exhaustive DI breakdown, including teams that are not partners.
    pub direct: TeamProgramTotals,
    /// Exhaustive DO breakdown for the month, including non-partner teams.
    pub domestic: TeamProgramTotals,
    pub row_counts: RowCounts,
}

impl MonthlyReport {
    pub fn partner_name(&self, partner: Partner) -> &str {
        &self.partners[partner.index()]
    }

    pub fn breakdown(&self, category: Category) -> &TeamProgramTotals {
        match category {
            Category::DirectImport => &self.direct,
            Category::Domestic => &self.domestic,
        }
    }

    /// Program totals for one (category, partner) pair; empty when the
    /// partner had no rows.
    pub fn partner_programs(
        &self,
        category: Category,
        partner: Partner,
    ) -> impl Iterator<Item = (&str, f64)> {
        self.breakdown(category)
            .get(self.partner_name(partner))
            .into_iter()
            .flat_map(|programs| programs.iter().map(|(p, v)| (p.as_str(), *v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_program_becomes_unknown() {
        let row = RevenueRow::new("Blackfin".into(), None, 200.0, None);
        assert_eq!(row.program, UNKNOWN_PROGRAM);
    }

    #[test]
    fn skip_total() {
        let s = SkipCounts { no_date: 1, no_team: 2, no_amount: 3 };
        assert_eq!(s.total(), 6);
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Domestic).unwrap();
        assert_eq!(json, "\"DO\"");
        assert_eq!(Category::DirectImport.to_string(), "DI");
    }
}
