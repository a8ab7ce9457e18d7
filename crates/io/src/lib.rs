// Workbook reading and report export

pub mod csv;
pub mod error;
pub mod json;
pub mod xlsx;

pub use error::IoError;
pub use xlsx::{is_supported_extension, read_workbook, read_workbook_file, SUPPORTED_EXTENSIONS};
