//! Error types for the file conversion pipeline.
//!
//! Errors are layered by how far they are allowed to travel:
//!
//! - [`FieldError`] - a single column value failed validation (row-level, never fatal)
//! - [`HeaderError`] - the header row does not match the schema (job-fatal)
//! - [`JobError`] - a conversion job had to be abandoned (job-fatal)
//! - [`ReportError`] - the error report could not be written (logged only)
//! - [`ConfigError`] - startup configuration is unusable (process-fatal)
//! - [`WatchError`] - the input directory cannot be watched (process-fatal)
//!
//! `From` conversions let `?` cross layer boundaries where escalation is
//! allowed. [`FieldError`] never converts into [`JobError`].

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Field Validation Errors
// =============================================================================

/// A single column value was rejected by its validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// `INTERNAL_ID` was empty.
    #[error("invalid or out-of-range id: INTERNAL_ID cannot be empty")]
    EmptyId,

    /// `INTERNAL_ID` contained something other than ASCII digits.
    #[error("invalid or out-of-range id: INTERNAL_ID must contain only digits")]
    IdNotNumeric,

    /// `INTERNAL_ID` had more than the allowed number of digits.
    #[error("invalid or out-of-range id: INTERNAL_ID must have at most {max} digits")]
    IdTooLong { max: usize },

    /// A required name column was empty or longer than allowed.
    #[error("{field} empty or too long: must have 1 to {max} characters")]
    NameEmptyOrTooLong { field: &'static str, max: usize },

    /// An optional name column was longer than allowed.
    #[error("{field} too long: must have at most {max} characters")]
    NameTooLong { field: &'static str, max: usize },

    /// `PHONE_NUM` did not match `###-###-####`.
    #[error("PHONE_NUM must be ###-###-####")]
    PhoneFormat,

    /// The row does not have one value per header column.
    #[error("expected {expected} columns but found {found}")]
    ColumnCount { expected: usize, found: usize },

    /// A required field was never set on the record builder.
    #[error("missing value for {0}")]
    MissingField(&'static str),
}

// =============================================================================
// Header Errors
// =============================================================================

/// The header row could not be bound to the fixed schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The file has no header line at all.
    #[error("file is empty, no header line found")]
    Missing,

    /// A header token does not name a known field.
    #[error("unknown header column: {0:?}")]
    Unknown(String),

    /// Not every field appears exactly once.
    #[error("incomplete header: missing {missing:?}, duplicated {duplicated:?}")]
    Incomplete {
        missing: Vec<&'static str>,
        duplicated: Vec<&'static str>,
    },
}

// =============================================================================
// Job Errors
// =============================================================================

/// Failures that abort a whole conversion job.
#[derive(Debug, Error)]
pub enum JobError {
    /// The submitted path is not an existing regular file.
    #[error("not a valid input file: {0}")]
    NotAFile(PathBuf),

    /// The input file could not be opened for reading.
    #[error("cannot open input file {path}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created.
    #[error("cannot open output file {path}: {source}")]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row was rejected.
    #[error("file {path} has an invalid header: {source}")]
    Header {
        path: PathBuf,
        #[source]
        source: HeaderError,
    },

    /// Reading the input failed partway through.
    #[error("an error occurred reading {path} at line {line}: {source}")]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: std::io::Error,
    },

    /// Writing the output failed partway through.
    #[error("an error occurred writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Report Errors
// =============================================================================

/// The error report could not be produced.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Creating or flushing the report file failed.
    #[error("cannot write error report: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV writer rejected a record.
    #[error("cannot encode error report: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Setup Errors
// =============================================================================

/// Configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("encountered an error reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`crate::config::Config`].
    #[error("config file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// One of the four directories was not supplied.
    #[error("missing required setting `{0}` (set it in config.json, the environment or on the command line)")]
    MissingSetting(&'static str),

    /// A configured path is not an existing directory.
    #[error("not a valid {kind} directory: {path}")]
    NotADirectory { kind: &'static str, path: PathBuf },
}

/// Problems with the directory watch subscription.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The input directory could not be listed.
    #[error("cannot scan input directory {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS watcher failed to start or reported an error.
    #[error("directory watcher failed: {0}")]
    Notify(#[from] notify::Error),

    /// Installing a signal handler failed.
    #[error("cannot install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    /// The event channel closed while the watcher was still expected to run.
    #[error("directory watcher stopped unexpectedly")]
    Closed,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for field validators.
pub type FieldResult<T> = Result<T, FieldError>;

/// Result type for header binding.
pub type HeaderResult<T> = Result<T, HeaderError>;

/// Result type for conversion jobs.
pub type JobResult<T> = Result<T, JobError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for the watcher.
pub type WatchResult<T> = Result<T, WatchError>;
