use chrono::Datelike;
use serde::Deserialize;

use crate::domestic::{DomesticColumns, DEFAULT_DOMESTIC_COLUMNS};
use crate::error::ReconError;
use crate::model::Partner;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Pipeline configuration. Every field has a default, so an empty TOML
/// document yields the stock setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    /// The two revenue-sharing partners, in report column order.
    pub partners: Vec<String>,
    pub direct: DirectConfig,
    pub domestic: DomesticConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            partners: vec!["Blackfin".into(), "Meridian".into()],
            direct: DirectConfig::default(),
            domestic: DomesticConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Direct Import
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectConfig {
    /// Exact (trimmed) sheet names that mark a DI workbook. The first one
    /// present is the sheet extracted.
    pub sheet_names: Vec<String>,
    pub columns: DirectColumns,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            sheet_names: vec!["Payment Detail".into(), "Payments Detail".into()],
            columns: DirectColumns::default(),
        }
    }
}

/// Accepted header aliases per logical DI field.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectColumns {
    pub team: Vec<String>,
    pub program: Vec<String>,
    pub paid_per_item: Vec<String>,
    pub net_amount: Vec<String>,
    pub payment_date: Vec<String>,
    pub discount_start_date: Vec<String>,
}

impl Default for DirectColumns {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }
        Self {
            team: names(&["Team", "Team Name", "Partner"]),
            program: names(&["Program", "Program Name"]),
            paid_per_item: names(&["Paid Per Item", "Paid/Item", "Amount Paid Per Item"]),
            net_amount: names(&["Discount Net Amount", "Payment Net Amount", "Net Amount"]),
            payment_date: names(&["Payment Date", "Paid Date"]),
            discount_start_date: names(&["Discount Start Date", "Discount Start"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Domestic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomesticConfig {
    /// Substring that marks a DO sheet name.
    pub marker: String,
    /// Year preferred when several DO sheets exist. Defaults to the
    /// current calendar year.
    pub reporting_year: Option<i32>,
    pub columns: DomesticColumns,
    /// Columns past this bound are never read.
    pub max_columns: usize,
}

impl Default for DomesticConfig {
    fn default() -> Self {
        Self {
            marker: "Domestic".into(),
            reporting_year: None,
            columns: DEFAULT_DOMESTIC_COLUMNS,
            max_columns: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.partners.len() != 2 {
            return Err(ReconError::ConfigValidation(format!(
                "exactly 2 partners are required, got {}",
                self.partners.len()
            )));
        }
        if self.partners.iter().any(|p| p.trim().is_empty()) {
            return Err(ReconError::ConfigValidation("partner names must not be blank".into()));
        }
        if self.partners[0].trim() == self.partners[1].trim() {
            return Err(ReconError::ConfigValidation(format!(
                "partner names must differ, both are '{}'",
                self.partners[0]
            )));
        }

        if self.direct.sheet_names.iter().all(|n| n.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "direct.sheet_names needs at least one name".into(),
            ));
        }
        let cols = &self.direct.columns;
        if cols.team.is_empty() {
            return Err(ReconError::ConfigValidation(
                "direct.columns.team needs at least one alias".into(),
            ));
        }
        if cols.paid_per_item.is_empty() && cols.net_amount.is_empty() {
            return Err(ReconError::ConfigValidation(
                "direct.columns needs paid_per_item or net_amount aliases".into(),
            ));
        }

        if self.domestic.marker.trim().is_empty() {
            return Err(ReconError::ConfigValidation("domestic.marker must not be blank".into()));
        }
        let max = self.domestic.max_columns;
        let dc = &self.domestic.columns;
        for (name, idx) in [
            ("date", dc.date),
            ("team", dc.team),
            ("program", dc.program),
            ("amount", dc.amount),
        ] {
            if idx >= max {
                return Err(ReconError::ConfigValidation(format!(
                    "domestic.columns.{name} = {idx} is outside max_columns = {max}"
                )));
            }
        }

        Ok(())
    }

    pub fn partner_name(&self, partner: Partner) -> &str {
        match partner {
            Partner::A => self.partners[0].trim(),
            Partner::B => self.partners[1].trim(),
        }
    }

    pub fn reporting_year(&self) -> i32 {
        self.domestic
            .reporting_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
