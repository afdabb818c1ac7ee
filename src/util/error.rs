//! Error types for the PLY library.

use std::path::PathBuf;
use thiserror::Error;

use super::ScalarType;

/// Main error type for PLY operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// First line is not the `ply` marker
    #[error("{file} is not a ply file")]
    NotPly { file: String },

    /// Header line could not be understood
    #[error("Incorrect format in {file} at line {line}: {reason}")]
    MalformedHeader {
        file: String,
        line: usize,
        reason: String,
    },

    /// Property declared with a type name outside the catalog
    #[error("Unknown type `{name}` in {file} at line {line}")]
    UnknownType {
        file: String,
        line: usize,
        name: String,
    },

    /// `property` line seen before any `element` line
    #[error("Property declared before any element in {file} at line {line}")]
    PropertyOutsideElement { file: String, line: usize },

    /// Input ended before `end_header`
    #[error("Missing end_header in {file}")]
    MissingEndHeader { file: String },

    /// A token cannot be decoded as the declared type
    #[error("Invalid {ty} value `{token}`: {reason}")]
    InvalidValue {
        token: String,
        ty: ScalarType,
        reason: String,
    },

    /// List count is negative or otherwise unusable
    #[error("Invalid list count for {element}.{property} at row {row}")]
    InvalidListCount {
        element: String,
        property: String,
        row: usize,
    },

    /// Body holds fewer values than the header declares
    #[error("Unexpected end of data in element `{element}` at row {row}")]
    Truncated { element: String, row: usize },

    /// ASCII body line with no tokens
    #[error("Empty line in element `{element}` at row {row}")]
    EmptyRow { element: String, row: usize },

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed header error.
    pub fn malformed(file: &str, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            file: file.to_string(),
            line,
            reason: reason.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(token: &str, ty: ScalarType, reason: impl ToString) -> Self {
        Self::InvalidValue {
            token: token.to_string(),
            ty,
            reason: reason.to_string(),
        }
    }

    /// Returns true for errors raised while reading the header.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::NotPly { .. }
                | Self::MalformedHeader { .. }
                | Self::UnknownType { .. }
                | Self::PropertyOutsideElement { .. }
                | Self::MissingEndHeader { .. }
        )
    }
}

/// Result type alias for PLY operations.
pub type Result<T> = std::result::Result<T, Error>;
