//! Table size limits and their TOML configuration file.
//!
//! ```toml
//! [limits]
//! max_rows = 20
//! max_columns = 8
//! ```
//!
//! Missing keys keep their defaults. The file is looked up at the path given on
//! the command line, else `<config dir>/gridcalc/config.toml`.

use directories::ProjectDirs;
use gridcalc_engine::engine::DEFAULT_MAX_DEPTH;
use log::{debug, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{GridcalcError, Result};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Size limits the document enforces on every structural edit.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    pub max_rows: usize,
    pub max_columns: usize,
    pub min_rows: usize,
    pub min_columns: usize,
    /// Longest column label accepted, in characters.
    pub max_label_len: usize,
    /// Longest formula reference chain followed during evaluation, at most
    /// [`DEFAULT_MAX_DEPTH`].
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_rows: 10,
            max_columns: 10,
            min_rows: 1,
            min_columns: 1,
            max_label_len: 50,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    limits: Option<Limits>,
}

impl Limits {
    /// Parse limits from TOML text. `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Limits> {
        let file: ConfigFile = toml::from_str(content).map_err(|err| GridcalcError::Config {
            path: origin.to_string(),
            message: err.to_string(),
        })?;
        let limits = file.limits.unwrap_or_default();
        limits.validate(origin)?;
        Ok(limits)
    }

    /// Read limits from a TOML file.
    pub fn load(path: &Path) -> Result<Limits> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > MAX_CONFIG_FILE_BYTES {
            return Err(GridcalcError::Config {
                path: path.display().to_string(),
                message: format!(
                    "file too large ({} bytes, max {})",
                    meta.len(),
                    MAX_CONFIG_FILE_BYTES
                ),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let limits = Self::from_toml_str(&content, &path.display().to_string())?;
        info!("loaded limits from {}", path.display());
        Ok(limits)
    }

    /// Load from `explicit` if given (it must exist), else from the user config
    /// file if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Limits> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match user_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("no config file found, using default limits");
                Ok(Limits::default())
            }
        }
    }

    fn validate(&self, origin: &str) -> Result<()> {
        let problem = if self.min_rows == 0 || self.min_columns == 0 {
            Some("min_rows and min_columns must be at least 1".to_string())
        } else if self.min_rows > self.max_rows {
            Some(format!(
                "min_rows ({}) exceeds max_rows ({})",
                self.min_rows, self.max_rows
            ))
        } else if self.min_columns > self.max_columns {
            Some(format!(
                "min_columns ({}) exceeds max_columns ({})",
                self.min_columns, self.max_columns
            ))
        } else if self.max_depth == 0 || self.max_depth > DEFAULT_MAX_DEPTH {
            Some(format!(
                "max_depth ({}) must be between 1 and {}",
                self.max_depth, DEFAULT_MAX_DEPTH
            ))
        } else {
            None
        };

        match problem {
            Some(message) => Err(GridcalcError::Config {
                path: origin.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }
}

/// `<config dir>/gridcalc/config.toml` for the current user, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
