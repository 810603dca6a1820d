//! Entry classification for raw log lines.
//!
//! Each entry in the log body starts with a header of the form
//!
//! ```text
//! [ 2010.06.21 19:04:33 ] (combat) <message text>
//! ```
//!
//! Lines without that header are continuations of a previous entry's
//! multi-line message. [`classify`] reports them as `None` and the
//! assembler drops them.

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::Category;
use crate::error::Result;
use crate::timestamp::{timestamp_from_captures, Timestamp, TIMESTAMP_PATTERN};

static ENTRY_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\[ {TIMESTAMP_PATTERN} \] \((?P<type>[^)]+)\) (?P<data>.+)$"
    ))
    .unwrap()
});

/// The header fields of a line that starts a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine<'a> {
    /// The bracketed timestamp.
    pub timestamp: Timestamp,
    /// The category from the parenthesized tag.
    pub category: Category,
    /// Everything after the header.
    pub text: &'a str,
}

/// Classifies one right-trimmed line of the log body.
///
/// # Returns
///
/// - `Ok(Some(entry))` if the line starts a new entry
/// - `Ok(None)` if the line is a continuation line
///
/// # Errors
///
/// - `ParserError::TimestampRange` if the header timestamp is not a valid date
/// - `ParserError::UnknownCategory` if the tag is outside the known table
///
/// # Example
///
/// ```
/// use gamelog_parser::entry::Category;
/// use gamelog_parser::line::classify;
///
/// let line = "[ 2010.06.21 19:04:33 ] (notify) Interference from the warp disruptor";
/// let entry = classify(line).unwrap().unwrap();
/// assert_eq!(entry.category, Category::Notify);
/// assert_eq!(entry.text, "Interference from the warp disruptor");
///
/// assert!(classify("  continued from the previous line").unwrap().is_none());
/// ```
pub fn classify(line: &str) -> Result<Option<EntryLine<'_>>> {
    let Some(caps) = ENTRY_LINE_RE.captures(line) else {
        return Ok(None);
    };

    let timestamp = timestamp_from_captures(&caps)?;
    let category = Category::from_tag(&caps["type"])?;
    let text = caps.name("data").map_or("", |m| m.as_str());

    Ok(Some(EntryLine {
        timestamp,
        category,
        text,
    }))
}
