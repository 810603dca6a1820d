//! Error types for the gamelog parser.
//!
//! This module defines the error hierarchy for every failure case during log
//! parsing: I/O errors, malformed headers, unknown entry categories, combat
//! lines that no dialect understands, and calendar-invalid timestamps.
//!
//! Nothing is recovered inside the parser. Every error aborts construction of
//! the [`Log`](crate::log::Log) and carries enough context (the raw line and,
//! for file parses, the path) for a caller to report it and move on.

use std::path::PathBuf;

use thiserror::Error;

use crate::combat::Dialect;

/// The main error type for gamelog parsing operations.
///
/// # Example
///
/// ```
/// use gamelog_parser::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(ParserError::InvalidHeader {
///         reason: "Missing \"Gamelog\" line in header".to_string(),
///     })
/// }
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while reading the log.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The fixed preamble at the top of the log is malformed or truncated.
    #[error("Invalid header: {reason}")]
    InvalidHeader {
        /// A description of what makes the header invalid.
        reason: String,
    },

    /// An entry header carried a category tag outside the known table.
    #[error("Unknown log entry type \"{tag}\"")]
    UnknownCategory {
        /// The tag found between the parentheses.
        tag: String,
    },

    /// A combat line matched none of the phrases of the dialect(s) tried.
    ///
    /// `dialect` is [`Dialect::Unknown`] when detection tried every dialect.
    #[error("Could not parse \"{text}\" as {dialect}")]
    DialectParse {
        /// The dialect that was attempted.
        dialect: Dialect,
        /// The raw combat text.
        text: String,
    },

    /// A timestamp had fields outside the calendar range.
    #[error("Timestamp out of range: {value}")]
    TimestampRange {
        /// The offending timestamp as it appeared in the log.
        value: String,
    },

    /// An error raised while parsing a specific line of the log body.
    #[error("line {line_number}: {source} (in \"{line}\")")]
    AtLine {
        /// 1-based line number within the file.
        line_number: usize,
        /// The raw line text.
        line: String,
        /// The underlying error.
        #[source]
        source: Box<ParserError>,
    },

    /// An error raised while parsing a log file from disk.
    #[error("{}: {source}", .path.display())]
    InFile {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: Box<ParserError>,
    },
}

impl ParserError {
    /// Creates an `InvalidHeader` error from any displayable reason.
    #[must_use]
    pub fn invalid_header(reason: impl Into<String>) -> Self {
        ParserError::InvalidHeader {
            reason: reason.into(),
        }
    }

    /// Wraps this error with the line it was raised on.
    #[must_use]
    pub fn at_line(self, line_number: usize, line: &str) -> Self {
        ParserError::AtLine {
            line_number,
            line: line.to_string(),
            source: Box::new(self),
        }
    }

    /// Wraps this error with the file it was raised in.
    #[must_use]
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        ParserError::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping line and file context.
    #[must_use]
    pub fn root(&self) -> &ParserError {
        match self {
            ParserError::AtLine { source, .. } | ParserError::InFile { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}

/// A specialized Result type for gamelog parsing operations.
pub type Result<T> = std::result::Result<T, ParserError>;
