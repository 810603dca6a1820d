//! The Simplified combat dialect.
//!
//! Short messages with the damage in bold:
//!
//! ```text
//! Enemy Drone hits you for <b>57</b> damage
//! Hobgoblin I strikes Guristas Pithi for <b>112</b> damage (Wrecking!)
//! Your Missile misses Enemy Frigate
//! ```
//!
//! When the listener is the target the subject is the attacker; otherwise
//! the subject is the listener's weapon.

use std::sync::LazyLock;

use regex::Regex;

use super::{Captured, Combatants};

/// Phrases in the order they are tried. `{D}` is the bold damage clause.
const PHRASES_SOURCE: &[&str] = &[
    r"(?P<attacker>.*) (?:hits|strikes) (?P<target>you) for {D}$",
    r"(?:Your )?(?P<weapon>.*) (?:hits|strikes) (?P<target>.*) for {D}$",
    r"(?P<attacker>.*) misses (?P<target>you)(?P<damage>)$",
    r"(?:Your )?(?P<weapon>.*) misses (?P<target>[^.]*)(?P<damage>)$",
    r"(?P<attacker>.*) miss (?P<target>you)(?P<damage>)$",
    r"(?:Your )?(?P<weapon>.*) miss (?P<target>[^.]*)(?P<damage>)$",
];

const DAMAGE_PATTERN: &str = r"<b>(?P<damage>\d+)</b> damage(?: \(Wrecking!\))?";

static PHRASES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PHRASES_SOURCE
        .iter()
        .map(|phrase| {
            let pattern = phrase.replace("{D}", DAMAGE_PATTERN);
            Regex::new(&format!("^(?:<color[^>]*>)?{pattern}")).unwrap()
        })
        .collect()
});

/// Parses a combat message in the Simplified dialect.
///
/// Returns `None` if no phrase matches.
///
/// # Example
///
/// ```
/// use gamelog_parser::combat::simplified;
///
/// let miss = simplified::parse("Your Missile misses Enemy Frigate").unwrap();
/// assert_eq!(miss.attacker, "You");
/// assert_eq!(miss.weapon, "Missile");
/// assert_eq!(miss.target, "Enemy Frigate");
/// assert_eq!(miss.damage, 0.0);
/// ```
#[must_use]
pub fn parse(text: &str) -> Option<Combatants> {
    PHRASES
        .iter()
        .find_map(|regex| regex.captures(text))
        .and_then(|caps| Captured::from_captures(&caps).into_combatants())
}
