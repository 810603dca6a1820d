//! Whole-log parsing.
//!
//! [`Log`] is the parsed form of one gamelog file: the header metadata, the
//! combat dialect detected for the file, and every entry in file order.
//! Parsing is all-or-nothing. The first malformed line aborts the parse and
//! the error names the line, so no partially populated log ever escapes.
//!
//! # Example
//!
//! ```
//! use gamelog_parser::combat::Dialect;
//! use gamelog_parser::log::Log;
//!
//! let text = "\
//! ------------------------------------------------------------
//!   Gamelog
//!   Listener: Some Pilot
//!   Session Started: 2010.06.21 19:03:12
//! ------------------------------------------------------------
//! [ 2010.06.21 19:04:33 ] (notify) Interference from the cargo container
//! [ 2010.06.21 19:04:35 ] (combat) Enemy Drone hits you for <b>57</b> damage
//! ";
//! let log = Log::parse_str(text).unwrap();
//! assert_eq!(log.listener(), Some("Some Pilot"));
//! assert_eq!(log.dialect(), Dialect::Simplified);
//! assert_eq!(log.num_entries(), 2);
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::combat::{resolve, Dialect};
use crate::entry::{Category, CombatEntry, GenericEntry, LogEntry};
use crate::error::{ParserError, Result};
use crate::header::LogHeader;
use crate::line::classify;
use crate::timestamp::Timestamp;

/// A fully parsed gamelog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Log {
    listener: Option<String>,
    start_time: Timestamp,
    dialect: Dialect,
    entries: Vec<LogEntry>,
}

impl Log {
    /// Parses a log from any buffered reader.
    ///
    /// # Errors
    ///
    /// - `ParserError::InvalidHeader` / `TimestampRange` for a bad preamble
    /// - `ParserError::AtLine` wrapping the first body line that fails to
    ///   classify or parse
    /// - `ParserError::IoError` if reading fails, wrapped in `AtLine` once
    ///   the header has been read
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
    /// rejected.
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = lossy_lines(reader);
        let header = LogHeader::read(&mut lines)?;

        let mut assembler = LogAssembler::new(header.listener, header.start_time);
        for (index, line) in lines.enumerate() {
            let line_number = header.line_count + index + 1;
            let line = line.map_err(|e| e.at_line(line_number, ""))?;
            assembler
                .push_line(line.trim_end())
                .map_err(|e| e.at_line(line_number, &line))?;
        }

        Ok(assembler.finish())
    }

    /// Parses a log held in memory.
    ///
    /// # Errors
    ///
    /// See [`Log::parse_reader`].
    pub fn parse_str(text: &str) -> Result<Self> {
        Self::parse_reader(text.as_bytes())
    }

    /// Parses a log file from disk.
    ///
    /// The file is closed before this function returns, whether parsing
    /// succeeded or not.
    ///
    /// # Errors
    ///
    /// Any error from [`Log::parse_reader`] or from opening the file,
    /// wrapped in `ParserError::InFile` with the path.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let parsed = File::open(path)
            .map_err(ParserError::from)
            .and_then(|file| Self::parse_reader(BufReader::new(file)));

        match parsed {
            Ok(log) => {
                tracing::debug!(
                    path = %path.display(),
                    entries = log.num_entries(),
                    dialect = %log.dialect,
                    "parsed gamelog"
                );
                Ok(log)
            }
            Err(e) => Err(e.in_file(path)),
        }
    }

    /// Returns the character the log was recorded for, if named.
    #[must_use]
    pub fn listener(&self) -> Option<&str> {
        self.listener.as_deref()
    }

    /// Returns when the recording session started.
    #[must_use]
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Returns the combat dialect used throughout the file.
    ///
    /// [`Dialect::Unknown`] if the log has no combat entries.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns every entry in file order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Returns an iterator over the combat entries in file order.
    pub fn combat_entries(&self) -> impl Iterator<Item = &CombatEntry> {
        self.entries.iter().filter_map(LogEntry::as_combat)
    }

    /// Returns the number of entries per category.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category()).or_insert(0) += 1;
        }
        counts
    }
}

/// Splits `reader` on `\n`, dropping a trailing `\r` and decoding each line
/// lossily.
fn lossy_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<String>> {
    reader.split(b'\n').map(|bytes| -> Result<String> {
        let mut bytes = bytes?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    })
}

/// Builds a [`Log`] from body lines, one at a time.
///
/// The assembler owns the file's dialect. It starts out
/// [`Dialect::Unknown`] and is set by the first combat line.
#[derive(Debug)]
pub struct LogAssembler {
    listener: Option<String>,
    start_time: Timestamp,
    dialect: Dialect,
    entries: Vec<LogEntry>,
}

impl LogAssembler {
    /// Starts a log with the given header metadata.
    #[must_use]
    pub fn new(listener: Option<String>, start_time: Timestamp) -> Self {
        LogAssembler {
            listener,
            start_time,
            dialect: Dialect::Unknown,
            entries: Vec::new(),
        }
    }

    /// Returns the dialect determined so far.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Classifies one right-trimmed body line and appends the resulting
    /// entry. Continuation lines are dropped.
    ///
    /// # Errors
    ///
    /// - `ParserError::UnknownCategory` / `TimestampRange` from the entry header
    /// - `ParserError::DialectParse` if a combat line cannot be parsed
    ///
    /// On error the assembler is left unchanged.
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        let Some(entry) = classify(line)? else {
            tracing::trace!(line, "dropping continuation line");
            return Ok(());
        };

        let entry = if entry.category == Category::Combat {
            let (dialect, combatants) = resolve(self.dialect, entry.text)?;
            if dialect != self.dialect {
                tracing::debug!(%dialect, "locked combat dialect");
                self.dialect = dialect;
            }
            LogEntry::Combat(combatants.into_entry(entry.timestamp, entry.text))
        } else {
            LogEntry::Generic(GenericEntry {
                timestamp: entry.timestamp,
                category: entry.category,
                text: entry.text.to_string(),
            })
        };

        self.entries.push(entry);
        Ok(())
    }

    /// Finishes the log.
    #[must_use]
    pub fn finish(self) -> Log {
        Log {
            listener: self.listener,
            start_time: self.start_time,
            dialect: self.dialect,
            entries: self.entries,
        }
    }
}
