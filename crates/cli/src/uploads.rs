use std::path::{Path, PathBuf};

use revsplit_io::{is_supported_extension, read_workbook_file, SUPPORTED_EXTENSIONS};
use revsplit_recon::{Rejected, SourceFile};

use crate::CliError;

/// Name a file is reported under: its final path component.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Uploads read from the command line.
#[derive(Debug, Default)]
pub struct Uploads {
    pub files: Vec<SourceFile>,
    /// Files without a spreadsheet extension, never opened.
    pub rejected: Vec<Rejected>,
}

/// Read every upload, keeping command-line order. Non-spreadsheet files are
/// set aside; a spreadsheet that cannot be opened aborts the run.
pub fn load_uploads(paths: &[PathBuf]) -> Result<Uploads, CliError> {
    let mut uploads = Uploads::default();
    for path in paths {
        let name = display_name(path);
        if !is_supported_extension(&name) {
            uploads.rejected.push(Rejected {
                filename: name,
                reason: format!(
                    "unsupported file type (expected one of .{})",
                    SUPPORTED_EXTENSIONS.join(", .")
                ),
            });
            continue;
        }
        let workbook = read_workbook_file(path)?;
        uploads.files.push(SourceFile::new(name, workbook));
    }
    Ok(uploads)
}
