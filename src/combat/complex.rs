//! The Complex combat dialect.
//!
//! The oldest phrasing. Every message is a verb phrase between an attacker
//! and a target, optionally followed by a damage clause:
//!
//! ```text
//! Your Hobgoblin I hits Guristas Pithi, doing 12.5 damage.
//! Guristas Pithi misses you completely.
//! Light Missile belonging to Someone lands a hit on you which glances off, doing 3.1 damage.
//! ```
//!
//! Each verb phrase is combined with three attacker forms, tried in order:
//! `Your [group of ]<weapon>`, `<weapon> belonging to <attacker>`, and a bare
//! `<attacker>` with no weapon. Damage is only captured in fractional form
//! (`12.5`); a damage clause without a decimal point reads as zero.
//!
//! Miss phrases carry a guard rejecting the match if the damage clause
//! follows the final period, so a miss can never swallow a hit message that
//! shares its verb.

use std::sync::LazyLock;

use regex::Regex;

use super::{Captured, Combatants};

/// The damage clause following a hit, e.g. `doing 12.5 damage`.
const DAMAGE_PATTERN: &str = r"[^,]*?(?P<damage>\d+\.\d+)?(?:</b>)? damage";

/// Optional leading color markup.
const COLOR_PREFIX: &str = r"(?:<color[^>]*>)?";

/// Attacker forms in the order they are tried for every verb phrase.
const ATTACKER_PATTERNS: &[&str] = &[
    r"(?P<attacker>You)r (?:group of )?(?P<weapon>.*?)",
    r"(?P<weapon>.*?) belonging to (?P<attacker>.*?)",
    r"(?P<attacker>.*?)(?P<weapon>)",
];

/// Verb phrases with `{A}` (attacker), `{T}` (target) and `{D}` (damage)
/// slots, and whether the phrase is a guarded miss.
const VERB_PHRASES: [(&str, bool); 11] = [
    (r"{A} (?:lightly |heavily )?hits {T}, {D}\.$", false),
    (r"{A} misses {T} completely\.$", true),
    (r"{A} aims well at {T}, {D}\.$", false),
    (r"{A} barely scratches {T}, {D}\.$", false),
    (r"{A} places an excellent hit on {T}, {D}\.$", false),
    (r"{A} lands a hit on {T} which glances off, {D}\.$", false),
    (r"{A} is well aimed at {T}, {D}\.$", false),
    (r"{A} barely misses {T}\.$", true),
    (r"{A} glances off {T}, {D}\.$", false),
    (r"{A} strikes {T} perfectly, {D}\.$", false),
    (r"{A} perfectly strikes {T}, {D}\.$", false),
];

const TARGET_PATTERN: &str = r"(?P<target>.*?)";

/// A compiled verb phrase with one attacker form.
struct Phrase {
    regex: Regex,
    guarded: bool,
}

impl Phrase {
    fn captures<'t>(&self, text: &'t str) -> Option<Captured<'t>> {
        let caps = self.regex.captures(text)?;
        if self.guarded {
            // Negative lookahead: the damage clause must not follow the period.
            let period_end = caps.get(0).map_or(text.len(), |m| m.end());
            if DAMAGE_GUARD_RE.is_match(&text[period_end..]) {
                return None;
            }
        }
        Some(Captured::from_captures(&caps))
    }
}

static DAMAGE_GUARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^(?:{DAMAGE_PATTERN})")).unwrap());

static PHRASES: LazyLock<Vec<Phrase>> = LazyLock::new(|| {
    VERB_PHRASES
        .iter()
        .flat_map(|&(verb, guarded)| {
            ATTACKER_PATTERNS.iter().map(move |attacker| {
                let pattern = verb
                    .replace("{A}", &format!("{COLOR_PREFIX}{attacker}"))
                    .replace("{T}", TARGET_PATTERN)
                    .replace("{D}", DAMAGE_PATTERN);
                Phrase {
                    regex: Regex::new(&format!("^{pattern}")).unwrap(),
                    guarded,
                }
            })
        })
        .collect()
});

/// Parses a combat message in the Complex dialect.
///
/// Returns `None` if no phrase matches.
///
/// # Example
///
/// ```
/// use gamelog_parser::combat::complex;
///
/// let hit = complex::parse("Your Hobgoblin I hits Guristas Pithi, doing 12.5 damage.").unwrap();
/// assert_eq!(hit.attacker, "You");
/// assert_eq!(hit.weapon, "Hobgoblin I");
/// assert_eq!(hit.target, "Guristas Pithi");
/// assert_eq!(hit.damage, 12.5);
/// ```
#[must_use]
pub fn parse(text: &str) -> Option<Combatants> {
    PHRASES
        .iter()
        .find_map(|phrase| phrase.captures(text))
        .and_then(Captured::into_combatants)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> Combatants {
        parse(text).unwrap_or_else(|| panic!("Complex should parse {text:?}"))
    }

    #[test]
    fn test_phrase_count() {
        assert_eq!(PHRASES.len(), VERB_PHRASES.len() * ATTACKER_PATTERNS.len());
    }

    #[test]
    fn test_own_weapon_hitting_listener() {
        // Target "you" wins: the listener is both sides, with no weapon.
        let hit = parsed("Your Smartbomb I hits you, doing 5.0 damage.");
        assert_eq!(hit.attacker, "You");
        assert_eq!(hit.target, "you");
        assert_eq!(hit.weapon, "");
        assert_eq!(hit.damage, 5.0);
    }

    #[test]
    fn test_bare_attacker_hit() {
        let hit = parsed("You hits Target Rat, doing 12.5 damage.");
        assert_eq!(hit.attacker, "You");
        assert_eq!(hit.target, "Target Rat");
        assert_eq!(hit.weapon, "");
        assert_eq!(hit.damage, 12.5);
    }

    #[test]
    fn test_your_weapon_hit() {
        let hit = parsed("Your 125mm Railgun I heavily hits Serpentis Scout, wrecking for 45.2 damage.");
        assert_eq!(hit.attacker, "You");
        assert_eq!(hit.weapon, "125mm Railgun I");
        assert_eq!(hit.target, "Serpentis Scout");
        assert_eq!(hit.damage, 45.2);
    }

    #[test]
    fn test_group_of_weapons() {
        let hit = parsed("Your group of Light Ion Blaster I perfectly strikes Rat, wrecking for 88.0 damage.");
        assert_eq!(hit.weapon, "Light Ion Blaster I");
        assert_eq!(hit.target, "Rat");
        assert_eq!(hit.damage, 88.0);
    }

    #[test]
    fn test_colored_attacker() {
        let hit = parsed("<color=0xffbb6600>Guristas Pithi barely scratches you, doing 2.1 damage.");
        assert_eq!(hit.attacker, "Guristas Pithi");
        assert_eq!(hit.target, "you");
        assert_eq!(hit.weapon, "");
        assert_eq!(hit.damage, 2.1);
    }

    #[test]
    fn test_belonging_to_against_player() {
        let hit = parsed(
            "Light Missile belonging to Bad Guy lands a hit on you which glances off, doing 3.5 damage.",
        );
        assert_eq!(hit.attacker, "Bad Guy");
        assert_eq!(hit.target, "you");
        assert_eq!(hit.weapon, "");
        assert_eq!(hit.damage, 3.5);
    }

    #[test]
    fn test_bold_damage_markup() {
        let hit = parsed("Rat aims well at you, inflicting <b>14.0</b> damage.");
        assert_eq!(hit.attacker, "Rat");
        assert_eq!(hit.damage, 14.0);
    }

    #[test]
    fn test_every_hit_verb() {
        for text in [
            "Your Gun hits Rat, doing 1.5 damage.",
            "Your Gun lightly hits Rat, doing 1.5 damage.",
            "Your Gun aims well at Rat, doing 1.5 damage.",
            "Your Gun barely scratches Rat, doing 1.5 damage.",
            "Your Gun places an excellent hit on Rat, doing 1.5 damage.",
            "Your Gun lands a hit on Rat which glances off, doing 1.5 damage.",
            "Your Gun is well aimed at Rat, doing 1.5 damage.",
            "Your Gun glances off Rat, doing 1.5 damage.",
            "Your Gun strikes Rat perfectly, doing 1.5 damage.",
            "Your Gun perfectly strikes Rat, doing 1.5 damage.",
        ] {
            let hit = parsed(text);
            assert_eq!(hit.weapon, "Gun", "{text}");
            assert_eq!(hit.target, "Rat", "{text}");
            assert_eq!(hit.damage, 1.5, "{text}");
        }
    }

    #[test]
    fn test_misses_have_no_damage() {
        let miss = parsed("Your Hobgoblin I misses Guristas Pithi completely.");
        assert_eq!(miss.weapon, "Hobgoblin I");
        assert_eq!(miss.target, "Guristas Pithi");
        assert_eq!(miss.damage, 0.0);

        let miss = parsed("Guristas Pithi barely misses you.");
        assert_eq!(miss.attacker, "Guristas Pithi");
        assert_eq!(miss.target, "you");
        assert_eq!(miss.damage, 0.0);
    }

    #[test]
    fn test_integral_damage_reads_as_zero() {
        let hit = parsed("Your Gun hits Rat, doing 12 damage.");
        assert_eq!(hit.damage, 0.0);
    }

    #[test]
    fn test_miss_guard_rejects_trailing_damage() {
        let guarded = &PHRASES[3];
        assert!(guarded.guarded);
        assert!(DAMAGE_GUARD_RE.is_match(" doing 4.5 damage"));
        assert!(!DAMAGE_GUARD_RE.is_match(""));
    }

    #[test]
    fn test_unrelated_text() {
        assert!(parse("Enemy Drone hits you for <b>57</b> damage").is_none());
        assert!(parse("Your Gun hits Rat").is_none());
        assert!(parse("").is_none());
    }
}
