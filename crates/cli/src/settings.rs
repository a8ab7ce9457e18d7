//! Config file lookup.
//!
//! Order: `--config` (or `REVSPLIT_CONFIG`), then
//! `<config dir>/revsplit/config.toml` if it exists, then built-in defaults.

use std::path::{Path, PathBuf};

use revsplit_recon::ReconConfig;
use tracing::debug;

use crate::exit_codes::EXIT_CONFIG;
use crate::CliError;

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("revsplit").join("config.toml"))
}

pub fn load_config(explicit: Option<&Path>) -> Result<ReconConfig, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => path,
            None => {
                debug!("no config file, using defaults");
                return Ok(ReconConfig::default());
            }
        },
    };

    let text = std::fs::read_to_string(&path).map_err(|e| {
        CliError::new(EXIT_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ReconConfig::from_toml(&text).map_err(|e| {
        CliError::new(EXIT_CONFIG, format!("{}: {e}", path.display()))
            .with_hint("every key is optional; remove unknown keys")
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "partners = [\"North\", \"South\"]\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.partners, vec!["North", "South"]);
    }

    #[test]
    fn invalid_config_maps_to_config_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "partners = [\"Only\"]\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(err.code, EXIT_CONFIG);
        assert!(err.message.contains("exactly 2 partners"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/revsplit.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_CONFIG);
    }
}
