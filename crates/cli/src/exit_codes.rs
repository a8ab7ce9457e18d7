//! CLI Exit Code Registry
//!
//! Single source of truth for `revsplit` exit codes. Scripts that drive the
//! monthly close rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (writing an export failed, etc.)           |
//! | 2    | Usage error (bad arguments, no DI files supplied)        |
//! | 3    | An input file is unsupported or unreadable               |
//! | 4    | Extraction failed (missing sheet, column, empty sheet)   |
//! | 5    | Nothing reportable came out of the supplied files        |
//! | 6    | Invalid configuration                                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant and document what triggers it
//! 2. Update the table above
//! 3. Map the error variant in [`recon_exit_code`] or [`io_exit_code`]

use revsplit_io::IoError;
use revsplit_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, or a batch without any DI workbook.
pub const EXIT_USAGE: u8 = 2;

/// An input file has an unsupported extension or could not be parsed.
pub const EXIT_INPUT: u8 = 3;

/// A workbook was recognized but its sheet or columns could not be extracted.
pub const EXIT_EXTRACT: u8 = 4;

/// Every DI file was processed but no report could be built.
pub const EXIT_EMPTY: u8 = 5;

/// Config file missing, unparseable or failing validation.
pub const EXIT_CONFIG: u8 = 6;

/// Map a pipeline error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::MissingSheet { .. }
        | ReconError::EmptySheet { .. }
        | ReconError::MissingColumn { .. }
        | ReconError::NoDomesticSheet { .. } => EXIT_EXTRACT,
        ReconError::NoDirectImportFiles => EXIT_USAGE,
        ReconError::EmptyResult => EXIT_EMPTY,
    }
}

/// Map a reading or export error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::UnsupportedFileType { .. } | IoError::Open { .. } | IoError::Sheet { .. } => {
            EXIT_INPUT
        }
        IoError::Io(_) => EXIT_INPUT,
        IoError::Export(_) | IoError::Csv(_) | IoError::Json(_) => EXIT_ERROR,
    }
}
