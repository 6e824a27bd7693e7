//! Header binding and line decoding for comma-delimited input.
//!
//! The column order of an input file is taken from its header row, so a
//! producer may emit the five schema columns in any order. Binding is
//! strict: every known column must appear exactly once and nothing else
//! may appear.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::{HeaderError, HeaderResult};
use crate::validation::{Field, FieldValidator, FIELD_COUNT};

/// Field delimiter of input files.
pub const DELIMITER: char = ',';

const UTF8_BOM: &str = "\u{feff}";

/// Validators for each column of a file, in file column order.
#[derive(Debug, Clone)]
pub struct BoundHeader {
    columns: Vec<Field>,
}

impl BoundHeader {
    /// Columns in the order they appear in the file.
    pub fn columns(&self) -> &[Field] {
        &self.columns
    }

    /// Number of bound columns; always [`FIELD_COUNT`].
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Validators in file column order.
    pub fn validators(&self) -> impl Iterator<Item = FieldValidator> + '_ {
        self.columns.iter().map(|f| f.validator())
    }
}

/// Bind a header line to the schema.
///
/// A leading byte-order mark and a trailing carriage return are ignored.
///
/// # Example
/// ```rust
/// use fileconverter::parser::bind_header;
///
/// let header = bind_header("PHONE_NUM,INTERNAL_ID,FIRST_NAME,MIDDLE_NAME,LAST_NAME").unwrap();
/// assert_eq!(header.len(), 5);
/// assert!(bind_header("INTERNAL_ID,FIRST_NAME").is_err());
/// ```
pub fn bind_header(line: &str) -> HeaderResult<BoundHeader> {
    let line = trim_line_ending(line.strip_prefix(UTF8_BOM).unwrap_or(line));

    let mut columns = Vec::with_capacity(FIELD_COUNT);
    for token in line.split(DELIMITER) {
        let field = Field::from_header(token).ok_or_else(|| HeaderError::Unknown(token.to_string()))?;
        columns.push(field);
    }

    let mut seen: BTreeMap<Field, usize> = BTreeMap::new();
    for field in &columns {
        *seen.entry(*field).or_default() += 1;
    }
    let missing: Vec<&'static str> = Field::ALL
        .into_iter()
        .filter(|f| !seen.contains_key(f))
        .map(Field::header)
        .collect();
    let duplicated: Vec<&'static str> = seen
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(f, _)| f.header())
        .collect();

    if columns.len() != FIELD_COUNT || !missing.is_empty() || !duplicated.is_empty() {
        return Err(HeaderError::Incomplete { missing, duplicated });
    }

    Ok(BoundHeader { columns })
}

/// Split a data row into its raw tokens.
pub fn split_row(line: &str) -> Vec<&str> {
    trim_line_ending(line).split(DELIMITER).collect()
}

/// Strip a trailing `\n` and/or `\r`.
pub fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Decode one raw input line.
///
/// Valid UTF-8 is borrowed as-is; anything else is decoded as
/// Windows-1252, which covers the Latin-1 exports spreadsheets produce.
pub fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}
