use serde::Serialize;

use crate::config::ReconConfig;
use crate::sheet::Workbook;

/// Source shape of an uploaded workbook, decided from sheet names alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Monthly Direct Import settlement workbook.
    DirectImport,
    /// Rolling Domestic payments ledger.
    Domestic,
    Unrecognized,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectImport => write!(f, "DI"),
            Self::Domestic => write!(f, "DO"),
            Self::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Classify a workbook by its sheet names.
///
/// An exact (trimmed) DI sheet name wins over a DO marker substring, so a
/// workbook carrying both is treated as DI. Content is never inspected.
pub fn classify(workbook: &Workbook, config: &ReconConfig) -> SourceKind {
    let is_di_name = |name: &str| {
        config
            .direct
            .sheet_names
            .iter()
            .any(|marker| name.trim() == marker.as_str())
    };
    if workbook.sheet_names().any(is_di_name) {
        return SourceKind::DirectImport;
    }
    if workbook
        .sheet_names()
        .any(|name| name.contains(config.domestic.marker.as_str()))
    {
        return SourceKind::Domestic;
    }
    SourceKind::Unrecognized
}
