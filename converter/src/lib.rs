//! # fileconverter - directory-watching CSV to JSON conversion
//!
//! Files dropped into an input directory are validated row by row against
//! a fixed person schema and written out as JSON arrays. Rows that fail
//! validation end up in a side-channel CSV error report instead of failing
//! the whole file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  input dir  │────▶│   Header    │────▶│    Row      │────▶│ <name>.json │
//! │  (watched)  │     │   Binder    │     │ Transformer │     │ + error CSV │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! After a successful conversion the input moves to the completed
//! directory. A file whose header is unusable, or that cannot be read or
//! written, stays where it is and its output is removed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fileconverter::{Config, ConversionJob};
//!
//! let dirs = Config::load(None)?.validate()?;
//! let outcome = ConversionJob::new("/data/in/people.csv", &dirs)?.process();
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types for every layer
//! - [`models`] - Output record and its builder
//! - [`validation`] - Per-column validators and the validator table
//! - [`parser`] - Header binding and line decoding
//! - [`transform`] - Row transformer and per-file conversion job
//! - [`report`] - Row error collection and the CSV error report
//! - [`config`] - Directory configuration
//! - [`watch`] - Startup scan, directory watching, signals
//! - [`logging`] - `tracing` subscriber setup

// Core modules
pub mod error;
pub mod models;

// Schema
pub mod validation;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Error reports
pub mod report;

// Runtime
pub mod config;
pub mod logging;
pub mod watch;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, FieldError, HeaderError, JobError, ReportError, WatchError};

// =============================================================================
// Re-exports - Models and schema
// =============================================================================

pub use models::{PersonName, PersonRecord, RecordBuilder};

pub use validation::{
    known_fields, set_first_name, set_id, set_last_name, set_middle_name, set_phone_number,
    validator_for, Field, FieldValidator, FIELD_COUNT,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use parser::{bind_header, BoundHeader};

pub use report::{ErrorCollector, RowError};

pub use transform::{
    transform_row, validate_row, ConversionJob, JobOutcome, JobSummary,
};

// =============================================================================
// Re-exports - Runtime
// =============================================================================

pub use config::{Config, Directories};

pub use watch::{run_job, Dispatcher};
