//! `revsplit classify` - show how uploads would be routed.

use std::path::{Path, PathBuf};

use serde::Serialize;

use revsplit_io::read_workbook_file;
use revsplit_recon::{classify, SourceKind};

use crate::exit_codes::{EXIT_ERROR, EXIT_INPUT};
use crate::settings::load_config;
use crate::uploads::display_name;
use crate::CliError;

#[derive(Serialize)]
struct ClassifyEntry {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<SourceKind>,
    sheets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn cmd_classify(
    files: Vec<PathBuf>,
    json_output: bool,
    config_path: Option<&Path>,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    let entries: Vec<ClassifyEntry> = files
        .iter()
        .map(|path| match read_workbook_file(path) {
            Ok(workbook) => ClassifyEntry {
                file: display_name(path),
                kind: Some(classify(&workbook, &config)),
                sheets: workbook.sheet_names().map(str::to_string).collect(),
                error: None,
            },
            Err(e) => ClassifyEntry {
                file: display_name(path),
                kind: None,
                sheets: Vec::new(),
                error: Some(e.to_string()),
            },
        })
        .collect();

    if json_output {
        let json_str = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        for entry in &entries {
            match (&entry.kind, &entry.error) {
                (Some(kind), _) => println!("{:<14}{}  [{}]", kind.to_string(), entry.file, entry.sheets.join(", ")),
                (None, Some(err)) => println!("{:<14}{}  ({})", "unreadable", entry.file, err),
                (None, None) => {}
            }
        }
    }

    let unreadable = entries.iter().filter(|e| e.error.is_some()).count();
    if unreadable > 0 {
        return Err(CliError::new(
            EXIT_INPUT,
            format!("{unreadable} of {} file(s) could not be read", entries.len()),
        ));
    }
    Ok(())
}
