//! Gamelog header parsing.
//!
//! Every gamelog opens with a fixed preamble between two rules of dashes:
//!
//! ```text
//! ------------------------------------------------------------
//!   Gamelog
//!   Listener: Some Pilot
//!   Session Started: 2010.06.21 19:03:12
//! ------------------------------------------------------------
//! ```
//!
//! The listener line is absent in logs that recorded nothing. Only the
//! first header is read; a file with several concatenated sessions is
//! treated as one.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ParserError, Result};
use crate::timestamp::{timestamp_from_captures, Timestamp, TIMESTAMP_PATTERN};

static DASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-+$").unwrap());
static GAMELOG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("Gamelog").unwrap());
static LISTENER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("Listener: (.*)").unwrap());
static SESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("Session [Ss]tarted: {TIMESTAMP_PATTERN}")).unwrap()
});

/// The metadata carried by a gamelog's preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHeader {
    /// The character the log was recorded for, if named.
    pub listener: Option<String>,
    /// When the recording session started.
    pub start_time: Timestamp,
    /// Number of lines the header occupied.
    pub line_count: usize,
}

impl LogHeader {
    /// Reads the header from the first lines of a log.
    ///
    /// Consumes exactly the header's lines from `lines` (four or five), so
    /// the iterator is left positioned on the first body line. Lines are
    /// right-trimmed before matching.
    ///
    /// # Errors
    ///
    /// - `ParserError::InvalidHeader` if a required line is missing or the
    ///   input ends before the closing rule
    /// - `ParserError::TimestampRange` if the session start is not a valid date
    /// - any error yielded by `lines`
    ///
    /// # Example
    ///
    /// ```
    /// use gamelog_parser::header::LogHeader;
    ///
    /// let text = "------\n  Gamelog\n  Listener: Some Pilot\n  Session Started: 2010.06.21 19:03:12\n------\n";
    /// let mut lines = text.lines().map(|l| Ok(l.to_string()));
    /// let header = LogHeader::read(&mut lines).unwrap();
    /// assert_eq!(header.listener.as_deref(), Some("Some Pilot"));
    /// assert_eq!(header.line_count, 5);
    /// ```
    pub fn read<I>(lines: &mut I) -> Result<Self>
    where
        I: Iterator<Item = Result<String>>,
    {
        let mut line_count = 0;
        let mut next_line = || -> Result<String> {
            let line = lines
                .next()
                .ok_or_else(|| ParserError::invalid_header("Cannot parse header -- too few lines"))??;
            line_count += 1;
            Ok(line.trim_end().to_string())
        };

        if !DASHES_RE.is_match(&next_line()?) {
            return Err(ParserError::invalid_header("Missing --- line at start of file"));
        }
        if !GAMELOG_RE.is_match(&next_line()?) {
            return Err(ParserError::invalid_header("Missing \"Gamelog\" line in header"));
        }

        let maybe_listener = next_line()?;
        let (listener, session_line) = match LISTENER_RE.captures(&maybe_listener) {
            Some(caps) => (Some(caps[1].to_string()), next_line()?),
            None => (None, maybe_listener),
        };

        let caps = SESSION_RE
            .captures(&session_line)
            .ok_or_else(|| ParserError::invalid_header("Missing \"Session started\" line in header"))?;
        let start_time = timestamp_from_captures(&caps)?;

        if !DASHES_RE.is_match(&next_line()?) {
            return Err(ParserError::invalid_header("Missing --- line to end header"));
        }

        Ok(LogHeader {
            listener,
            start_time,
            line_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::format_timestamp;

    fn read(text: &str) -> Result<LogHeader> {
        let mut lines = text.lines().map(|l| Ok(l.to_string()));
        LogHeader::read(&mut lines)
    }

    fn reason(err: ParserError) -> String {
        match err {
            ParserError::InvalidHeader { reason } => reason,
            other => panic!("Expected InvalidHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_header_with_listener() {
        let header = read(
            "------------------------------------------------------------\n\
             \x20 Gamelog\n\
             \x20 Listener: Some Pilot\n\
             \x20 Session Started: 2010.06.21 19:03:12\n\
             ------------------------------------------------------------\n",
        )
        .unwrap();
        assert_eq!(header.listener.as_deref(), Some("Some Pilot"));
        assert_eq!(format_timestamp(&header.start_time), "2010.06.21 19:03:12");
        assert_eq!(header.line_count, 5);
    }

    #[test]
    fn test_header_without_listener() {
        let header = read("---\nGamelog\nSession started: 2009.01.02 03:04:05\n---\n").unwrap();
        assert!(header.listener.is_none());
        assert_eq!(format_timestamp(&header.start_time), "2009.01.02 03:04:05");
        assert_eq!(header.line_count, 4);
    }

    #[test]
    fn test_trailing_whitespace_is_ignored() {
        let header = read("---   \r\nGamelog  \nListener: Pilot  \nSession Started: 2009.01.02 03:04:05 \n--- \n").unwrap();
        assert_eq!(header.listener.as_deref(), Some("Pilot"));
    }

    #[test]
    fn test_leaves_body_unconsumed() {
        let text = "---\nGamelog\nSession started: 2009.01.02 03:04:05\n---\nfirst body line\n";
        let mut lines = text.lines().map(|l| Ok(l.to_string()));
        LogHeader::read(&mut lines).unwrap();
        assert_eq!(lines.next().unwrap().unwrap(), "first body line");
    }

    #[test]
    fn test_missing_opening_rule() {
        let err = read("Gamelog\nSession started: 2009.01.02 03:04:05\n---\n").unwrap_err();
        assert!(reason(err).contains("start of file"));
    }

    #[test]
    fn test_missing_gamelog_line() {
        let err = read("---\nChatlog\nSession started: 2009.01.02 03:04:05\n---\n").unwrap_err();
        assert!(reason(err).contains("Gamelog"));
    }

    #[test]
    fn test_missing_session_line() {
        let err = read("---\nGamelog\nListener: Pilot\n---\n").unwrap_err();
        assert!(reason(err).contains("Session started"));
    }

    #[test]
    fn test_missing_closing_rule() {
        let err = read("---\nGamelog\nSession started: 2009.01.02 03:04:05\n[ 2009.01.02 03:04:05 ] (info) x\n").unwrap_err();
        assert!(reason(err).contains("end header"));
    }

    #[test]
    fn test_too_few_lines() {
        for text in ["", "---\n", "---\nGamelog\n", "---\nGamelog\nListener: Pilot\n"] {
            let err = read(text).unwrap_err();
            assert!(reason(err).contains("too few lines"), "{text:?}");
        }
    }

    #[test]
    fn test_invalid_session_timestamp() {
        let err = read("---\nGamelog\nSession started: 2009.13.02 03:04:05\n---\n").unwrap_err();
        assert!(matches!(err, ParserError::TimestampRange { .. }));
    }

    #[test]
    fn test_io_errors_propagate() {
        let mut lines = std::iter::once(Err(ParserError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        ))));
        assert!(matches!(
            LogHeader::read(&mut lines),
            Err(ParserError::IoError(_))
        ));
    }
}
