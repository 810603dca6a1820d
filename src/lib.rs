//! # Gamelog Parser
//!
//! A parser for space-combat game client gamelogs.
//!
//! A gamelog is a text file with a short header followed by timestamped,
//! categorized entries. Combat entries have been written in three dialects
//! over the client's lifetime:
//! - **Complex**: `Hobgoblin I hits Rat, doing 12.5 damage.` with many verbs
//! - **Simplified**: `Enemy Drone hits you for <b>57</b> damage`
//! - **V3**: markup-heavy `<b>94</b> to <b>Rat</b> - Hobgoblin II - Hits`
//!
//! A file uses one dialect throughout. It is detected from the first combat
//! entry and then locked for the rest of the file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gamelog_parser::error::Result;
//! use gamelog_parser::log::Log;
//!
//! fn summarize(path: &str) -> Result<()> {
//!     let log = Log::parse_file(path)?;
//!
//!     println!("Listener: {}", log.listener().unwrap_or("(none)"));
//!     println!("Dialect: {}", log.dialect());
//!     println!("Entries: {}", log.num_entries());
//!
//!     for hit in log.combat_entries() {
//!         println!(
//!             "{} -> {} with {:?}: {}",
//!             hit.attacker, hit.target, hit.weapon, hit.damage
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias for parser operations
//! - [`timestamp`] - Gamelog timestamp parsing and formatting
//! - [`header`] - The preamble naming the listener and session start
//! - [`line`] - Splitting entry lines into timestamp, category and text
//! - [`entry`] - Categories and generic/combat entry types
//! - [`combat`] - Dialect detection and per-dialect combat message parsers
//! - [`log`] - Whole-log assembly with continuation lines and dialect locking
//! - [`streams`] - Grouping combat entries into per-weapon damage streams

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod combat;
pub mod entry;
pub mod error;
pub mod header;
pub mod line;
pub mod log;
pub mod streams;
pub mod timestamp;

// Re-export commonly used types at the crate root
pub use combat::{resolve, Combatants, Dialect};
pub use entry::{Category, CombatEntry, GenericEntry, LogEntry};
pub use error::{ParserError, Result};
pub use header::LogHeader;
pub use log::{Log, LogAssembler};
pub use streams::{enemy_info, extract_streams, DamageSample, DamageStream, EnemyInfo};
pub use timestamp::Timestamp;
