//! Log entry types.
//!
//! A gamelog body is a sequence of entries, each introduced by a
//! `[ timestamp ] (category)` header. Most categories are kept as raw text;
//! combat entries are additionally broken down into attacker, target, weapon
//! and damage by the [`combat`](crate::combat) module.
//!
//! [`LogEntry`] is a tagged variant over the two shapes so category-specific
//! fields only exist on the combat variant.

use std::fmt;

use serde::Serialize;

use crate::error::{ParserError, Result};
use crate::timestamp::Timestamp;

/// The literal attacker name used when the listener is the aggressor.
pub const PLAYER_ATTACKER: &str = "You";

/// The literal target name used when the listener is being attacked.
pub const PLAYER_TARGET: &str = "you";

/// The category tag of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// Unrecognized category. Never produced by the classifier.
    Unknown,
    /// `(combat)`: attacks, misses and effects.
    Combat,
    /// `(info)`
    Info,
    /// `(notify)`
    Notify,
    /// `(warning)`
    Warning,
    /// `(question)`
    Question,
    /// `(hint)`
    Hint,
    /// `(None)`, the client's literal untyped tag.
    None,
}

impl Category {
    /// Maps an entry header tag to its category.
    ///
    /// The table is exact and case-sensitive: `None` is capitalized in the
    /// client's output while every other tag is lowercase.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnknownCategory` for any tag outside the table.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "combat" => Ok(Category::Combat),
            "info" => Ok(Category::Info),
            "notify" => Ok(Category::Notify),
            "warning" => Ok(Category::Warning),
            "question" => Ok(Category::Question),
            "hint" => Ok(Category::Hint),
            "None" => Ok(Category::None),
            _ => Err(ParserError::UnknownCategory {
                tag: tag.to_string(),
            }),
        }
    }

    /// Returns the tag as it appears in the log.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Category::Unknown => "unknown",
            Category::Combat => "combat",
            Category::Info => "info",
            Category::Notify => "notify",
            Category::Warning => "warning",
            Category::Question => "question",
            Category::Hint => "hint",
            Category::None => "None",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A non-combat entry. The text is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericEntry {
    /// When the entry was written.
    pub timestamp: Timestamp,
    /// The entry's category. Never `Combat`.
    pub category: Category,
    /// Message text after the entry header.
    pub text: String,
}

/// A combat entry with the participants and damage extracted.
///
/// When `target` is [`PLAYER_TARGET`] the attacker is whoever the message
/// named and `weapon` is empty; otherwise `attacker` is [`PLAYER_ATTACKER`].
/// A Complex message about the listener's own weapon hitting them (a
/// smartbomb) has `"You"` on both sides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatEntry {
    /// When the entry was written.
    pub timestamp: Timestamp,
    /// Message text after the entry header.
    pub text: String,
    /// `"You"` or the enemy's identity string.
    pub attacker: String,
    /// `"you"` or the enemy's identity string.
    pub target: String,
    /// The listener's weapon, empty when unknown or when the listener was hit.
    pub weapon: String,
    /// Damage dealt. Zero means a miss or a non-damaging effect.
    pub damage: f64,
    /// Effect name for electronic warfare lines (e.g. `Warp Scramble Attempt`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

impl CombatEntry {
    /// Returns whether the listener was the one attacking.
    #[must_use]
    pub fn is_outgoing(&self) -> bool {
        self.target != PLAYER_TARGET
    }

    /// Returns whether this entry records a miss (no damage and no effect).
    #[must_use]
    pub fn is_miss(&self) -> bool {
        self.damage == 0.0 && self.effect.is_none()
    }

    /// Returns the name of the other party in the exchange.
    #[must_use]
    pub fn enemy(&self) -> &str {
        if self.is_outgoing() {
            &self.target
        } else {
            &self.attacker
        }
    }
}

/// One entry of a parsed gamelog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    /// Any entry other than combat.
    Generic(GenericEntry),
    /// A parsed combat entry.
    Combat(CombatEntry),
}

impl LogEntry {
    /// Returns when the entry was written.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        match self {
            LogEntry::Generic(e) => e.timestamp,
            LogEntry::Combat(e) => e.timestamp,
        }
    }

    /// Returns the entry's category.
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            LogEntry::Generic(e) => e.category,
            LogEntry::Combat(_) => Category::Combat,
        }
    }

    /// Returns the raw message text after the entry header.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            LogEntry::Generic(e) => &e.text,
            LogEntry::Combat(e) => &e.text,
        }
    }

    /// Returns the combat details, if this is a combat entry.
    #[must_use]
    pub fn as_combat(&self) -> Option<&CombatEntry> {
        match self {
            LogEntry::Combat(e) => Some(e),
            LogEntry::Generic(_) => None,
        }
    }

    /// Returns whether this is a combat entry.
    #[must_use]
    pub fn is_combat(&self) -> bool {
        matches!(self, LogEntry::Combat(_))
    }
}
