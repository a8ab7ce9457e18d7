use thiserror::Error;

/// Failures reading uploads or writing report exports.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("{file}: unsupported file type (expected one of .xlsx, .xlsm, .xlsb, .xls, .ods)")]
    UnsupportedFileType { file: String },

    #[error("{file}: failed to open workbook: {reason}")]
    Open { file: String, reason: String },

    #[error("{file}: failed to read sheet '{sheet}': {reason}")]
    Sheet {
        file: String,
        sheet: String,
        reason: String,
    },

    #[error("spreadsheet export failed: {0}")]
    Export(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for IoError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        IoError::Export(e.to_string())
    }
}
