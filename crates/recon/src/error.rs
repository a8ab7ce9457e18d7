use thiserror::Error;

/// Fatal pipeline errors. Row-level data gaps are never errors; they are
/// counted in [`crate::model::SkipCounts`] instead.
#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (partner names, column indices, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// The expected sheet is not present in the workbook.
    #[error("{file}: sheet '{sheet}' not found")]
    MissingSheet { file: String, sheet: String },
    /// The sheet has no data rows below its header.
    #[error("{file}: sheet '{sheet}' has no data rows")]
    EmptySheet { file: String, sheet: String },
    /// A required column could not be resolved from the header row.
    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },
    /// No sheet name matched the Domestic marker.
    #[error("{file}: no sheet name contains '{marker}'")]
    NoDomesticSheet { file: String, marker: String },
    /// The batch contained no Direct Import workbook.
    #[error("no DI files supplied")]
    NoDirectImportFiles,
    /// Every DI file was processed but nothing reportable came out.
    #[error("no monthly reports could be built from the supplied files")]
    EmptyResult,
}
