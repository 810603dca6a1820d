//! The V3 combat dialect.
//!
//! The current client wraps combat messages in color and font markup and
//! states the direction with a preposition instead of word order:
//!
//! ```text
//! <color=0xff00ffff><b>94</b> <color=0x77ffffff><font size=10>to</font> <b><color=0xffffffff>Guristas Pithi</b><font size=10><color=0x77ffffff> - Hobgoblin II - Hits
//! <color=0xffcc0000><b>23</b> <color=0x77ffffff><font size=10>from</font> <b><color=0xffffffff>Guristas Pithi</b><font size=10><color=0x77ffffff> - Smashes
//! Your Hobgoblin II misses Guristas Pithi completely - Hobgoblin II
//! Guristas Pithi misses you completely
//! ```
//!
//! Electronic warfare effects share the combat category and name the
//! effect, the source and the target:
//!
//! ```text
//! <color=0xffffffff><b>Warp scramble attempt</b> <color=0x77ffffff><font size=10>from</font> <color=0xffffffff><b>Guristas Pithi</b> <color=0x77ffffff><font size=10>to <b><color=0xffffffff></font>you!
//! ```

use std::sync::LazyLock;

use regex::Regex;

use super::{Captured, Combatants};
use crate::entry::{PLAYER_ATTACKER, PLAYER_TARGET};

static STRUCTURED_HIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^<color[^>]*><b>(?P<damage>[0-9]+)</b> ",
        r"<color[^>]*><font[^>]*>(?P<preposition>to|from)</font> ",
        r"<b><color[^>]*>(?P<object>.*)</b><font[^>]*><color[^>]*>",
        r"(?: - (?P<weapon>.*))?",
        r" - (?:Glances Off|Grazes|Hits|Penetrates|Smashes|Wrecks)$",
    ))
    .unwrap()
});

static ENEMY_MISS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<attacker>.*) misses (?P<target>you) completely$").unwrap()
});

static EWAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^<color[^>]*><b>(?P<effect>.*)</b> ",
        r"<color[^>]*><font[^>]*>from</font> ",
        r"<color[^>]*><b>(?P<attacker>.*)</b> ",
        r"<color[^>]*><font[^>]*>to <b><color[^>]*></font>(?P<target>.*)!$",
    ))
    .unwrap()
});

const OWN_MISS_PREFIX: &str = "Your ";
const OWN_MISS_VERB: &str = " misses ";
const OWN_MISS_SEPARATOR: &str = " completely - ";

/// `<damage> to|from <object> [- <weapon>] - <quality>`
fn structured_hit(text: &str) -> Option<Captured<'_>> {
    let caps = STRUCTURED_HIT_RE.captures(text)?;
    let object = caps.name("object").map(|m| m.as_str());
    let damage = caps.name("damage").map(|m| m.as_str());
    let weapon = caps.name("weapon").map(|m| m.as_str());

    let captured = match caps.name("preposition").map(|m| m.as_str()) {
        Some("to") => Captured {
            attacker: Some(PLAYER_ATTACKER),
            target: object,
            weapon,
            damage,
            effect: None,
        },
        _ => Captured {
            attacker: object,
            target: Some(PLAYER_TARGET),
            weapon,
            damage,
            effect: None,
        },
    };
    Some(captured)
}

/// `Your <weapon> misses <target> completely - <weapon>`
///
/// The weapon is repeated at the end of the line. The line is split on every
/// candidate separator, longest weapon first, and a split is accepted only if
/// the trailing weapon also opens the line.
fn own_miss(text: &str) -> Option<Captured<'_>> {
    let rest = text.strip_prefix(OWN_MISS_PREFIX)?;
    if rest.contains('\n') {
        return None;
    }

    (0..rest.len())
        .filter(|&at| rest.is_char_boundary(at) && rest[at..].starts_with(OWN_MISS_SEPARATOR))
        .find_map(|at| {
            let weapon = &rest[at + OWN_MISS_SEPARATOR.len()..];
            let target = rest[..at]
                .strip_prefix(weapon)?
                .strip_prefix(OWN_MISS_VERB)?;
            Some(Captured {
                attacker: Some(PLAYER_ATTACKER),
                target: Some(target),
                weapon: Some(weapon),
                damage: None,
                effect: None,
            })
        })
}

fn enemy_miss(text: &str) -> Option<Captured<'_>> {
    ENEMY_MISS_RE
        .captures(text)
        .map(|caps| Captured::from_captures(&caps))
}

fn ewar_effect(text: &str) -> Option<Captured<'_>> {
    EWAR_RE.captures(text).map(|caps| Captured::from_captures(&caps))
}

/// Parses a combat message in the V3 dialect.
///
/// Returns `None` if no phrase matches.
///
/// # Example
///
/// ```
/// use gamelog_parser::combat::v3;
///
/// let miss = v3::parse("Your Hobgoblin II misses Guristas Pithi completely - Hobgoblin II").unwrap();
/// assert_eq!(miss.attacker, "You");
/// assert_eq!(miss.weapon, "Hobgoblin II");
/// assert_eq!(miss.target, "Guristas Pithi");
/// assert_eq!(miss.damage, 0.0);
/// ```
#[must_use]
pub fn parse(text: &str) -> Option<Combatants> {
    let phrases: [fn(&str) -> Option<Captured<'_>>; 4] =
        [structured_hit, own_miss, enemy_miss, ewar_effect];

    phrases
        .iter()
        .find_map(|phrase| phrase(text))
        .and_then(Captured::into_combatants)
}
