// JSON export

use std::path::Path;
use std::fs::File;
use std::io::BufWriter;

use revsplit_recon::MonthlyReport;

use crate::error::IoError;

/// Pretty-printed JSON array of the full report records.
pub fn to_json(reports: &[MonthlyReport]) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(reports)?)
}

/// Write [`to_json`] output to `path`.
pub fn export(reports: &[MonthlyReport], path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, reports)?;
    Ok(())
}
