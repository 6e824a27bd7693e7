//! Transformation module.
//!
//! This module turns input files into output records:
//! - Row: validates one data line into a record or a row error
//! - Pipeline: the per-file conversion job

pub mod pipeline;
pub mod row;

pub use pipeline::*;
pub use row::{transform_row, validate_row};
