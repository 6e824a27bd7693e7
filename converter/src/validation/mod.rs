//! Field validators for the person schema.
//!
//! Every input column maps to exactly one validator. A validator checks the
//! raw text of its column and, on success, writes the value into a
//! [`RecordBuilder`]. Validators never touch a second field.
//!
//! | Header        | Rule                                   |
//! |---------------|----------------------------------------|
//! | `INTERNAL_ID` | 1 to 8 ASCII digits, cannot be empty   |
//! | `FIRST_NAME`  | 1 to 15 characters                     |
//! | `MIDDLE_NAME` | 0 to 15 characters                     |
//! | `LAST_NAME`   | 1 to 15 characters                     |
//! | `PHONE_NUM`   | `###-###-####`                         |
//!
//! # Example
//!
//! ```rust
//! use fileconverter::models::RecordBuilder;
//! use fileconverter::validation::{set_id, set_phone_number};
//!
//! let mut builder = RecordBuilder::new();
//! assert!(set_id(&mut builder, "12345678").is_ok());
//! assert!(set_phone_number(&mut builder, "+1-304-555-5555").is_err());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::{FieldError, FieldResult};
use crate::models::RecordBuilder;

/// Maximum number of digits in `INTERNAL_ID`.
pub const MAX_ID_DIGITS: usize = 8;

/// Maximum length, in characters, of any name column.
pub const MAX_NAME_CHARACTERS: usize = 15;

/// Exact length of a `PHONE_NUM` value.
pub const PHONE_LENGTH: usize = 12;

/// Number of columns every input file must carry.
pub const FIELD_COUNT: usize = Field::ALL.len();

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").expect("valid phone regex"));

static ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,8}$").expect("valid id regex"));

/// Signature shared by all field validators.
pub type FieldValidator = fn(&mut RecordBuilder, &str) -> FieldResult<()>;

// =============================================================================
// Fields
// =============================================================================

/// The columns of the input schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    InternalId,
    FirstName,
    MiddleName,
    LastName,
    PhoneNum,
}

impl Field {
    /// All fields, in canonical header order.
    pub const ALL: [Field; 5] = [
        Field::InternalId,
        Field::FirstName,
        Field::MiddleName,
        Field::LastName,
        Field::PhoneNum,
    ];

    /// Header token naming this field.
    pub fn header(self) -> &'static str {
        match self {
            Field::InternalId => "INTERNAL_ID",
            Field::FirstName => "FIRST_NAME",
            Field::MiddleName => "MIDDLE_NAME",
            Field::LastName => "LAST_NAME",
            Field::PhoneNum => "PHONE_NUM",
        }
    }

    /// Look up a field by its exact header token.
    pub fn from_header(token: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|f| f.header() == token)
    }

    /// The validator responsible for this field.
    pub fn validator(self) -> FieldValidator {
        match self {
            Field::InternalId => set_id,
            Field::FirstName => set_first_name,
            Field::MiddleName => set_middle_name,
            Field::LastName => set_last_name,
            Field::PhoneNum => set_phone_number,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Header name -> validator, built once and read-only afterwards.
pub static FIELD_VALIDATORS: Lazy<HashMap<&'static str, FieldValidator>> = Lazy::new(|| {
    Field::ALL
        .into_iter()
        .map(|field| (field.header(), field.validator()))
        .collect()
});

/// Find the validator for a header token.
pub fn validator_for(header: &str) -> Option<FieldValidator> {
    FIELD_VALIDATORS.get(header).copied()
}

/// Header names of every known field, in canonical order.
pub fn known_fields() -> impl Iterator<Item = &'static str> {
    Field::ALL.into_iter().map(Field::header)
}

// =============================================================================
// Validators
// =============================================================================

fn validate_required_name(value: &str, field: &'static str) -> FieldResult<()> {
    let len = value.chars().count();
    if len == 0 || len > MAX_NAME_CHARACTERS {
        return Err(FieldError::NameEmptyOrTooLong {
            field,
            max: MAX_NAME_CHARACTERS,
        });
    }
    Ok(())
}

/// `INTERNAL_ID`: 1 to 8 ASCII digits.
pub fn set_id(builder: &mut RecordBuilder, value: &str) -> FieldResult<()> {
    if value.is_empty() {
        return Err(FieldError::EmptyId);
    }
    if !ID_REGEX.is_match(value) {
        if value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldError::IdTooLong { max: MAX_ID_DIGITS });
        }
        return Err(FieldError::IdNotNumeric);
    }
    // At most 8 digits always fits.
    let id: u32 = value.parse().map_err(|_| FieldError::IdNotNumeric)?;
    builder.id(id);
    Ok(())
}

/// `FIRST_NAME`: required, at most 15 characters.
pub fn set_first_name(builder: &mut RecordBuilder, value: &str) -> FieldResult<()> {
    validate_required_name(value, Field::FirstName.header())?;
    builder.first_name(value);
    Ok(())
}

/// `MIDDLE_NAME`: optional, at most 15 characters.
pub fn set_middle_name(builder: &mut RecordBuilder, value: &str) -> FieldResult<()> {
    if value.chars().count() > MAX_NAME_CHARACTERS {
        return Err(FieldError::NameTooLong {
            field: Field::MiddleName.header(),
            max: MAX_NAME_CHARACTERS,
        });
    }
    builder.middle_name(value);
    Ok(())
}

/// `LAST_NAME`: required, at most 15 characters.
pub fn set_last_name(builder: &mut RecordBuilder, value: &str) -> FieldResult<()> {
    validate_required_name(value, Field::LastName.header())?;
    builder.last_name(value);
    Ok(())
}

/// `PHONE_NUM`: exactly `###-###-####`.
pub fn set_phone_number(builder: &mut RecordBuilder, value: &str) -> FieldResult<()> {
    if value.len() != PHONE_LENGTH || !PHONE_REGEX.is_match(value) {
        return Err(FieldError::PhoneFormat);
    }
    builder.phone(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> RecordBuilder {
        let mut b = RecordBuilder::new();
        set_id(&mut b, "1").unwrap();
        set_first_name(&mut b, "Ada").unwrap();
        set_last_name(&mut b, "Lovelace").unwrap();
        set_phone_number(&mut b, "555-555-5555").unwrap();
        b
    }

    #[test]
    fn test_id_validation_non_number() {
        let mut b = RecordBuilder::new();
        assert_eq!(set_id(&mut b, "Must be a number"), Err(FieldError::IdNotNumeric));
    }

    #[test]
    fn test_id_validation_too_long() {
        let mut b = RecordBuilder::new();
        assert_eq!(
            set_id(&mut b, "1234567890"),
            Err(FieldError::IdTooLong { max: 8 })
        );
    }

    #[test]
    fn test_id_validation_ok() {
        let mut b = complete_builder();
        set_id(&mut b, "12345678").unwrap();
        assert_eq!(b.build().unwrap().id, 12345678);
    }

    #[test]
    fn test_id_validation_empty_and_signed() {
        let mut b = RecordBuilder::new();
        assert_eq!(set_id(&mut b, ""), Err(FieldError::EmptyId));
        assert_eq!(set_id(&mut b, "-5"), Err(FieldError::IdNotNumeric));
        assert_eq!(set_id(&mut b, " 12"), Err(FieldError::IdNotNumeric));
    }

    #[test]
    fn test_id_rejects_non_ascii_digits() {
        // Arabic-Indic digits are `\d` in Unicode regex mode.
        let mut b = RecordBuilder::new();
        assert_eq!(set_id(&mut b, "١٢٣"), Err(FieldError::IdNotNumeric));
    }

    #[test]
    fn test_id_leading_zeros_accepted() {
        let mut b = complete_builder();
        set_id(&mut b, "00000042").unwrap();
        assert_eq!(b.build().unwrap().id, 42);
    }

    #[test]
    fn test_phone_number_validation_fail() {
        let mut b = RecordBuilder::new();
        assert_eq!(
            set_phone_number(&mut b, "+1-304-555-5555"),
            Err(FieldError::PhoneFormat)
        );
        assert_eq!(set_phone_number(&mut b, "5555555555"), Err(FieldError::PhoneFormat));
        assert_eq!(set_phone_number(&mut b, "555-555-555a"), Err(FieldError::PhoneFormat));
        assert_eq!(set_phone_number(&mut b, ""), Err(FieldError::PhoneFormat));
    }

    #[test]
    fn test_required_names() {
        let mut b = RecordBuilder::new();
        assert!(set_first_name(&mut b, "").is_err());
        assert!(set_first_name(&mut b, "Bartholomew-Jon").is_ok()); // 15 chars
        assert!(set_first_name(&mut b, "Bartholomew-Jons").is_err()); // 16 chars
        assert_eq!(
            set_last_name(&mut b, ""),
            Err(FieldError::NameEmptyOrTooLong {
                field: "LAST_NAME",
                max: 15
            })
        );
    }

    #[test]
    fn test_name_length_counts_characters() {
        // 15 characters, 30 bytes.
        let name = "ééééééééééééééé";
        assert_eq!(name.chars().count(), 15);
        let mut b = RecordBuilder::new();
        assert!(set_first_name(&mut b, name).is_ok());
    }

    #[test]
    fn test_middle_name_may_be_empty() {
        let mut b = complete_builder();
        set_middle_name(&mut b, "").unwrap();
        assert_eq!(b.clone().build().unwrap().name.middle, "");
        assert_eq!(
            set_middle_name(&mut b, "abcdefghijklmnop"),
            Err(FieldError::NameTooLong {
                field: "MIDDLE_NAME",
                max: 15
            })
        );
    }

    #[test]
    fn test_failed_validation_leaves_builder_untouched() {
        let mut b = complete_builder();
        assert!(set_first_name(&mut b, "").is_err());
        assert_eq!(b.build().unwrap().name.first, "Ada");
    }

    #[test]
    fn test_validator_table_covers_every_field() {
        assert_eq!(FIELD_VALIDATORS.len(), FIELD_COUNT);
        for name in known_fields() {
            assert!(validator_for(name).is_some(), "{name}");
        }
        assert!(validator_for("internal_id").is_none());
        assert!(validator_for("EMAIL").is_none());
    }

    #[test]
    fn test_field_header_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_header(field.header()), Some(field));
        }
        assert_eq!(Field::from_header(" PHONE_NUM"), None);
    }
}
