//! Row transformer: one data line in, at most one record out.

use crate::error::FieldError;
use crate::models::{PersonRecord, RecordBuilder};
use crate::parser::{split_row, BoundHeader};
use crate::report::ErrorCollector;

/// Validate one data row against the bound header.
///
/// On the first failing column the row is abandoned, exactly one error is
/// recorded under `line` and `None` is returned. Never fails the job.
pub fn transform_row(
    header: &BoundHeader,
    line: &str,
    line_number: u64,
    errors: &mut ErrorCollector,
) -> Option<PersonRecord> {
    match validate_row(header, line) {
        Ok(record) => Some(record),
        Err(err) => {
            errors.record(line_number, err);
            None
        }
    }
}

/// Validate one data row, returning the first failure.
pub fn validate_row(header: &BoundHeader, line: &str) -> Result<PersonRecord, FieldError> {
    let tokens = split_row(line);
    if tokens.len() != header.len() {
        return Err(FieldError::ColumnCount {
            expected: header.len(),
            found: tokens.len(),
        });
    }

    let mut builder = RecordBuilder::new();
    for (validate, token) in header.validators().zip(tokens) {
        validate(&mut builder, token)?;
    }
    builder.build()
}
