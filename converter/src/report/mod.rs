//! Row error collection and the CSV error report.
//!
//! Rows that fail validation do not stop a conversion. They are collected
//! here, in the order they were found, and written out once the input has
//! been fully read:
//!
//! ```text
//! LINE_NUM,ERROR_MSG
//! 3,PHONE_NUM must be ###-###-####
//! 7,FIRST_NAME empty or too long: must have 1 to 15 characters
//! ```
//!
//! No report file exists for a file that converted cleanly.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{FieldError, ReportError};

/// Header row of every error report.
pub const REPORT_HEADER: [&str; 2] = ["LINE_NUM", "ERROR_MSG"];

/// A rejected data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number; the header is line 1.
    pub line: u64,
    pub error: FieldError,
}

impl RowError {
    pub fn new(line: u64, error: FieldError) -> Self {
        Self { line, error }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.error)
    }
}

/// Row errors of one conversion job.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<RowError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: u64, error: FieldError) {
        self.errors.push(RowError::new(line, error));
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    /// Serialize the report, header included, into `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), ReportError> {
        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        csv.write_record(REPORT_HEADER)?;
        for row in &self.errors {
            csv.write_record([row.line.to_string(), row.error.to_string()])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the report to `path`, replacing any previous file.
    ///
    /// Returns `Ok(false)` without touching the filesystem when there is
    /// nothing to report.
    pub fn write_report(&self, path: &Path) -> Result<bool, ReportError> {
        if self.errors.is_empty() {
            return Ok(false);
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(true)
    }
}
