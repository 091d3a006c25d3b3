#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Schema-versioned decoders for the BAAC road-accident survey files.
//!
//! Each file family has a [`reader::RowDecoder`] that turns one CSV row into
//! a typed record, interpreting the row according to the survey year
//! encoded in the file name. Coded attributes go through the declarative
//! [`registry::DomainRegistry`], which owns every per-field sentinel and
//! alias rule.
//!
//! Decoding is streaming and strict: the first row that fails to decode
//! aborts the family with the offending file and row attached.

pub mod characteristics;
pub mod corrections;
pub mod equipment;
pub mod files;
pub mod locations;
pub mod parsing;
pub mod persons;
pub mod progress;
pub mod reader;
pub mod registry;
pub mod row;
pub mod vehicles;

use std::path::PathBuf;

/// A single field of a row could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// A coded value falls outside its field's closed domain.
    #[error("invalid code {value:?} for field {field}")]
    InvalidCategoryCode {
        /// Column the value was read from.
        field: String,
        /// Raw value as found in the file.
        value: String,
    },

    /// The hour-minute field has more than four digits.
    #[error("malformed time field {value:?}")]
    MalformedTimeField {
        /// Raw value as found in the file.
        value: String,
    },

    /// A column required by the decoder is absent from the file.
    #[error("missing column {column}")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A numeric field could not be parsed.
    #[error("invalid number {value:?} for field {field}")]
    InvalidNumber {
        /// Column the value was read from.
        field: String,
        /// Raw value as found in the file.
        value: String,
    },

    /// A numeric field that must be non-negative holds a negative value.
    #[error("negative value {value:?} for field {field}")]
    NegativeValue {
        /// Column the value was read from.
        field: String,
        /// Raw value as found in the file.
        value: String,
    },

    /// Date components do not form a valid calendar date and time.
    #[error("invalid date: {message}")]
    InvalidDate {
        /// Description of what went wrong.
        message: String,
    },
}

/// Errors that abort decoding of a file family.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file name carries no recognizable survey year.
    #[error("cannot infer survey year from file name {}", .path.display())]
    SchemaInference {
        /// Offending file.
        path: PathBuf,
    },

    /// A row failed to decode.
    #[error("{}:{}: {} (row: {})", .path.display(), .line, .source, .row)]
    Row {
        /// File the row was read from.
        path: PathBuf,
        /// Line number of the row in the file.
        line: u64,
        /// Row contents, as `column=value` pairs.
        row: String,
        /// Field-level cause.
        source: FieldError,
    },

    /// The CSV layer could not read a record.
    #[error("CSV error in {}: {}", .path.display(), .source)]
    Csv {
        /// File being read.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// An embedded domain table is malformed.
    #[error("invalid domain table {name}: {message}")]
    Registry {
        /// Name of the table.
        name: String,
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
