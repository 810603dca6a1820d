//! Combat entry parsing.
//!
//! The game client has phrased combat messages three different ways over
//! its history, and a gamelog carries no version tag saying which one it
//! uses. This module holds one matcher per phrasing ("dialect"):
//!
//! - [`complex`] - the oldest, verbose phrasing
//!   (`Your Gun hits Rat, doing 12.5 damage.`)
//! - [`simplified`] - short phrasing with bold damage
//!   (`Rat hits you for <b>57</b> damage`)
//! - [`v3`] - markup-heavy phrasing with `to`/`from` prepositions
//!
//! and the resolver that picks between them. A file's dialect is inferred
//! from its first combat entry by trying [`Dialect::DETECTION_ORDER`] and is
//! then fixed for the rest of the file.
//!
//! # Example
//!
//! ```
//! use gamelog_parser::combat::{resolve, Dialect};
//!
//! let (dialect, hit) = resolve(Dialect::Unknown, "Enemy Drone hits you for <b>57</b> damage").unwrap();
//! assert_eq!(dialect, Dialect::Simplified);
//! assert_eq!(hit.attacker, "Enemy Drone");
//! assert_eq!(hit.damage, 57.0);
//!
//! // Once locked, other dialects are no longer considered.
//! assert!(resolve(dialect, "You hits Target Rat, doing 12.5 damage.").is_err());
//! ```

pub mod complex;
pub mod simplified;
pub mod v3;

use std::fmt;

use regex::Captures;
use serde::Serialize;

use crate::entry::{CombatEntry, PLAYER_ATTACKER, PLAYER_TARGET};
use crate::error::{ParserError, Result};
use crate::timestamp::Timestamp;

/// The phrasing used for combat messages throughout one log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Dialect {
    /// Not yet determined; no combat entry has been parsed.
    #[default]
    Unknown,
    /// Verbose phrasing: `... hits Target, doing 12.5 damage.`
    Complex,
    /// Short phrasing: `... hits you for <b>57</b> damage`
    Simplified,
    /// Markup phrasing with explicit `to`/`from` prepositions.
    V3,
}

impl Dialect {
    /// The order in which dialects are tried while the dialect is unknown.
    pub const DETECTION_ORDER: [Dialect; 3] = [Dialect::V3, Dialect::Simplified, Dialect::Complex];

    /// Returns whether a concrete dialect has been determined.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Dialect::Unknown)
    }

    /// Parses combat text with this dialect's phrases only.
    ///
    /// Returns `None` if no phrase matches, or always for
    /// [`Dialect::Unknown`].
    #[must_use]
    pub fn parse(self, text: &str) -> Option<Combatants> {
        match self {
            Dialect::Unknown => None,
            Dialect::Complex => complex::parse(text),
            Dialect::Simplified => simplified::parse(text),
            Dialect::V3 => v3::parse(text),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Unknown => f.write_str("any dialect"),
            Dialect::Complex => f.write_str("Complex"),
            Dialect::Simplified => f.write_str("Simplified"),
            Dialect::V3 => f.write_str("V3"),
        }
    }
}

/// The participants and damage extracted from one combat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatants {
    /// `"You"` or the enemy's identity string.
    pub attacker: String,
    /// `"you"` or the enemy's identity string.
    pub target: String,
    /// The listener's weapon, or empty.
    pub weapon: String,
    /// Damage dealt, zero for misses and effects.
    pub damage: f64,
    /// Effect name for electronic warfare messages.
    pub effect: Option<String>,
}

impl Combatants {
    /// Attaches the entry header fields to produce a [`CombatEntry`].
    #[must_use]
    pub fn into_entry(self, timestamp: Timestamp, text: &str) -> CombatEntry {
        CombatEntry {
            timestamp,
            text: text.to_string(),
            attacker: self.attacker,
            target: self.target,
            weapon: self.weapon,
            damage: self.damage,
            effect: self.effect,
        }
    }
}

/// Raw fields captured by one phrase, before the direction rules apply.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Captured<'t> {
    pub attacker: Option<&'t str>,
    pub target: Option<&'t str>,
    pub weapon: Option<&'t str>,
    pub damage: Option<&'t str>,
    pub effect: Option<&'t str>,
}

impl<'t> Captured<'t> {
    /// Reads the conventionally named groups out of a regex match.
    pub fn from_captures(caps: &Captures<'t>) -> Self {
        let group = |name: &str| caps.name(name).map(|m| m.as_str());
        Captured {
            attacker: group("attacker"),
            target: group("target"),
            weapon: group("weapon"),
            damage: group("damage"),
            effect: group("effect"),
        }
    }

    /// Applies the direction rules shared by every dialect.
    ///
    /// When the target is the listener the captured attacker is kept and the
    /// weapon dropped; otherwise the listener is the attacker and the
    /// captured weapon (if any) is kept. A missing or empty damage group is a
    /// miss.
    ///
    /// Returns `None` if the damage text is not a number.
    pub fn into_combatants(self) -> Option<Combatants> {
        let damage = match self.damage {
            Some(amount) if !amount.is_empty() => amount.parse::<f64>().ok()?,
            _ => 0.0,
        };

        let target = self.target.unwrap_or_default();
        let (attacker, weapon) = if target == PLAYER_TARGET {
            (self.attacker.unwrap_or_default(), "")
        } else {
            (PLAYER_ATTACKER, self.weapon.unwrap_or_default())
        };

        Some(Combatants {
            attacker: attacker.to_string(),
            target: target.to_string(),
            weapon: weapon.to_string(),
            damage,
            effect: self.effect.map(str::to_string),
        })
    }
}

/// Parses one combat message, detecting the dialect if necessary.
///
/// With a known `dialect` only that dialect is tried. With
/// [`Dialect::Unknown`] each dialect of [`Dialect::DETECTION_ORDER`] is tried
/// and the first one that matches is returned alongside the result, for the
/// caller to keep for the rest of the file.
///
/// # Errors
///
/// Returns `ParserError::DialectParse` carrying the raw text if no phrase of
/// the dialect(s) tried matches.
pub fn resolve(dialect: Dialect, text: &str) -> Result<(Dialect, Combatants)> {
    if dialect.is_known() {
        return dialect
            .parse(text)
            .map(|combatants| (dialect, combatants))
            .ok_or_else(|| ParserError::DialectParse {
                dialect,
                text: text.to_string(),
            });
    }

    for candidate in Dialect::DETECTION_ORDER {
        if let Some(combatants) = candidate.parse(text) {
            tracing::debug!(dialect = %candidate, "detected combat dialect");
            return Ok((candidate, combatants));
        }
    }

    Err(ParserError::DialectParse {
        dialect: Dialect::Unknown,
        text: text.to_string(),
    })
}
