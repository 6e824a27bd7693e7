//! Runtime configuration.
//!
//! The four working directories are resolved in layers, later layers
//! winning:
//!
//! 1. a JSON config file (`config.json` by default)
//! 2. `FILECONVERTER_*` environment variables, `.env` included
//! 3. command-line flags
//!
//! Layers 2 and 3 are handled by clap in `main.rs` and arrive here as
//! [`Config::merge`] overrides.
//!
//! ```json
//! {
//!   "input_path": "/data/in",
//!   "output_path": "/data/out",
//!   "error_path": "/data/errors",
//!   "completed_path": "/data/completed"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Directory settings as read from file, environment or flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input_path: Option<PathBuf>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub error_path: Option<PathBuf>,
    #[serde(default)]
    pub completed_path: Option<PathBuf>,
}

impl Config {
    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the config file.
    ///
    /// An explicitly requested file must exist. The default file is
    /// optional and an empty config is used when it is absent.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Overlay every setting present in `overrides`.
    pub fn merge(mut self, overrides: Config) -> Self {
        if overrides.input_path.is_some() {
            self.input_path = overrides.input_path;
        }
        if overrides.output_path.is_some() {
            self.output_path = overrides.output_path;
        }
        if overrides.error_path.is_some() {
            self.error_path = overrides.error_path;
        }
        if overrides.completed_path.is_some() {
            self.completed_path = overrides.completed_path;
        }
        self
    }

    /// Check that all four settings name existing directories.
    pub fn validate(&self) -> ConfigResult<Directories> {
        Ok(Directories {
            input: require_dir(&self.input_path, "input_path", "input")?,
            output: require_dir(&self.output_path, "output_path", "output")?,
            errors: require_dir(&self.error_path, "error_path", "error")?,
            completed: require_dir(&self.completed_path, "completed_path", "completed")?,
        })
    }
}

fn require_dir(
    value: &Option<PathBuf>,
    setting: &'static str,
    kind: &'static str,
) -> ConfigResult<PathBuf> {
    let path = match value {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Err(ConfigError::MissingSetting(setting)),
    };
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            kind,
            path: path.clone(),
        });
    }
    Ok(path.clone())
}

/// Validated working directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    /// Watched for new files.
    pub input: PathBuf,
    /// Receives `<name>.json` outputs.
    pub output: PathBuf,
    /// Receives error reports.
    pub errors: PathBuf,
    /// Receives inputs after a successful conversion.
    pub completed: PathBuf,
}
