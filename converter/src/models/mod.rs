//! Domain models for the conversion pipeline.
//!
//! - [`PersonRecord`] - one validated output row
//! - [`PersonName`] - nested name block of a record
//! - [`RecordBuilder`] - write target for field validators

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

// =============================================================================
// Output Record
// =============================================================================

/// A fully validated person, serialized as one element of the output array.
///
/// Only [`RecordBuilder::build`] creates values of this type, so every
/// instance has passed all field validators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: u32,
    pub name: PersonName,
    pub phone: String,
}

/// Name block of a [`PersonRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,
    /// Omitted from the JSON output when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub middle: String,
    pub last: String,
}

// =============================================================================
// Builder
// =============================================================================

/// Accumulates validated column values for one row.
///
/// Each field validator sets exactly one slot. A record can only be
/// produced once every required slot is filled.
#[derive(Debug, Default, Clone)]
pub struct RecordBuilder {
    id: Option<u32>,
    first: Option<String>,
    middle: Option<String>,
    last: Option<String>,
    phone: Option<String>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&mut self, id: u32) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn first_name(&mut self, first: impl Into<String>) -> &mut Self {
        self.first = Some(first.into());
        self
    }

    pub fn middle_name(&mut self, middle: impl Into<String>) -> &mut Self {
        self.middle = Some(middle.into());
        self
    }

    pub fn last_name(&mut self, last: impl Into<String>) -> &mut Self {
        self.last = Some(last.into());
        self
    }

    pub fn phone(&mut self, phone: impl Into<String>) -> &mut Self {
        self.phone = Some(phone.into());
        self
    }

    /// Finish the record.
    ///
    /// Fails with [`FieldError::MissingField`] naming the first unset
    /// required field. The middle name defaults to empty.
    pub fn build(self) -> Result<PersonRecord, FieldError> {
        Ok(PersonRecord {
            id: self.id.ok_or(FieldError::MissingField("id"))?,
            name: PersonName {
                first: self.first.ok_or(FieldError::MissingField("name.first"))?,
                middle: self.middle.unwrap_or_default(),
                last: self.last.ok_or(FieldError::MissingField("name.last"))?,
            },
            phone: self.phone.ok_or(FieldError::MissingField("phone"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bobby_tables() -> RecordBuilder {
        let mut builder = RecordBuilder::new();
        builder
            .id(12345678)
            .first_name("Bobby")
            .last_name("Tables")
            .phone("555-555-5555");
        builder
    }

    #[test]
    fn test_build_complete_record() {
        let record = bobby_tables().build().unwrap();
        assert_eq!(record.id, 12345678);
        assert_eq!(record.name.first, "Bobby");
        assert_eq!(record.name.middle, "");
        assert_eq!(record.name.last, "Tables");
        assert_eq!(record.phone, "555-555-5555");
    }

    #[test]
    fn test_build_reports_missing_field() {
        let mut builder = RecordBuilder::new();
        builder.id(1).first_name("Ada").last_name("Lovelace");
        assert_eq!(builder.build(), Err(FieldError::MissingField("phone")));
    }

    #[test]
    fn test_empty_middle_name_is_omitted() {
        let record = bobby_tables().build().unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"id":12345678,"name":{"first":"Bobby","last":"Tables"},"phone":"555-555-5555"}"#
        );
    }

    #[test]
    fn test_middle_name_is_serialized_when_present() {
        let mut builder = bobby_tables();
        builder.middle_name("Drop");
        let json = serde_json::to_value(builder.build().unwrap()).unwrap();
        assert_eq!(json["name"]["middle"], "Drop");
    }
}
