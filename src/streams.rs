//! Damage stream extraction.
//!
//! Groups a log's combat entries into damage streams: one time series per
//! direction (dealt or received), weapon and enemy. Enemy identity strings
//! in combat messages look like
//!
//! ```text
//! Pilot Name [CORP]&lt;ALLY&gt;'Ship Name'(Ship Type)
//! ```
//!
//! and are decoded by [`enemy_info`] so that the same pilot is grouped
//! across ships, and each stream can report the enemy's ticker and the ship
//! types they flew.
//!
//! # Example
//!
//! ```
//! use gamelog_parser::log::Log;
//! use gamelog_parser::streams::extract_streams;
//!
//! let text = "---\nGamelog\nSession started: 2010.06.21 19:03:12\n---\n\
//! [ 2010.06.21 19:04:35 ] (combat) Hobgoblin I hits Rat for <b>10</b> damage\n\
//! [ 2010.06.21 19:04:36 ] (combat) Hobgoblin I hits Rat for <b>12</b> damage\n";
//! let log = Log::parse_str(text).unwrap();
//!
//! let streams = extract_streams(&log);
//! assert_eq!(streams.len(), 1);
//! assert_eq!(streams[0].weapon, "Hobgoblin I");
//! assert_eq!(streams[0].total_damage, 22.0);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::entry::CombatEntry;
use crate::log::Log;
use crate::timestamp::Timestamp;

/// Placeholder for stream fields that could not be determined.
pub const UNKNOWN: &str = "Unknown";

const MIDDLE_CHAR: &str = "['A-Za-z0-9]";
const FIRST_LAST_CHAR: &str = "[A-Za-z0-9]";
const TICKER_CHAR: &str = "[-'. A-Za-z0-9]";

static ENEMY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        concat!(
            r"^\s*(?P<name>{fl}{m}*(?: {m}*)??{fl})",
            r"\s*(?:\[(?P<corp>{t}+)\])?",
            r"\s*(?:&lt;(?P<alliance>{t}+)&gt;)?",
            r"\s*(?:'.*')?",
            r"\s*\((?P<ship>[A-Za-z ]+)\)\s*$",
        ),
        fl = FIRST_LAST_CHAR,
        m = MIDDLE_CHAR,
        t = TICKER_CHAR,
    ))
    .unwrap()
});

/// The decoded parts of an enemy identity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyInfo {
    /// The pilot (or NPC) name.
    pub name: String,
    /// The ship type, if the string named one.
    pub ship: Option<String>,
    /// `CORP`, `CORP (ALLY)`, or empty without a corp; `None` if the string
    /// could not be decoded.
    pub ticker: Option<String>,
}

/// Decodes an enemy identity string.
///
/// Strings that don't have the expected shape are returned whole as the
/// name, with no ship or ticker.
///
/// # Example
///
/// ```
/// use gamelog_parser::streams::enemy_info;
///
/// let info = enemy_info("Bad Guy [EVIL]&lt;BAD.A&gt;'Killer'(Rifter)");
/// assert_eq!(info.name, "Bad Guy");
/// assert_eq!(info.ship.as_deref(), Some("Rifter"));
/// assert_eq!(info.ticker.as_deref(), Some("EVIL (BAD.A)"));
/// ```
#[must_use]
pub fn enemy_info(id: &str) -> EnemyInfo {
    let Some(caps) = ENEMY_RE.captures(id) else {
        return EnemyInfo {
            name: id.to_string(),
            ship: None,
            ticker: None,
        };
    };

    let mut name = &caps["name"];
    let ship = caps.name("ship").map(|m| m.as_str().to_string());
    let corp = caps.name("corp").map(|m| m.as_str());
    let alliance = caps.name("alliance").map(|m| m.as_str());

    // Without a corp ticker, a ship called "Name's Rifter" reads as the
    // two-word name "Name 'Name".
    if corp.is_none() && ship.is_some() {
        name = strip_duplicated_name(name);
    }

    let corp = corp.unwrap_or_default();
    let ticker = match alliance {
        Some(alliance) => format!("{corp} ({alliance})"),
        None => corp.to_string(),
    };

    EnemyInfo {
        name: name.to_string(),
        ship,
        ticker: Some(ticker),
    }
}

/// Reduces `Foo 'Foo...` to `Foo`; other names are returned unchanged.
fn strip_duplicated_name(name: &str) -> &str {
    match name.split_once(' ') {
        Some((first, rest)) if rest.strip_prefix('\'').is_some_and(|r| r.starts_with(first)) => {
            first
        }
        _ => name,
    }
}

/// Damage dealt in one second of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageSample {
    /// The second the damage landed.
    pub timestamp: Timestamp,
    /// Total damage landed in that second.
    pub amount: f64,
}

/// Damage dealt over time by one weapon/enemy pairing in one direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageStream {
    /// `"You"` or the enemy name.
    pub attacker: String,
    /// `"You"` or the enemy name.
    pub target: String,
    /// The weapon, or `Unknown`.
    pub weapon: String,
    /// The enemy's corp/alliance ticker, or `Unknown`.
    pub ticker: String,
    /// Comma-separated ship types seen for the enemy, or `Unknown`.
    pub enemy_ships: String,
    /// Per-second damage in time order.
    pub damage: Vec<DamageSample>,
    /// Sum of all samples.
    pub total_damage: f64,
    /// First sample time.
    pub start_time: Option<Timestamp>,
    /// Last sample time.
    pub end_time: Option<Timestamp>,
}

impl DamageStream {
    /// Builds a stream from samples in non-decreasing time order.
    #[must_use]
    pub fn new(
        attacker: String,
        target: String,
        weapon: &str,
        ticker: String,
        enemy_ships: &BTreeSet<String>,
        damage: Vec<DamageSample>,
    ) -> Self {
        let weapon = if weapon.is_empty() { UNKNOWN } else { weapon };
        let enemy_ships = if enemy_ships.is_empty() {
            UNKNOWN.to_string()
        } else {
            enemy_ships.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        };

        DamageStream {
            attacker,
            target,
            weapon: weapon.to_string(),
            ticker,
            enemy_ships,
            total_damage: damage.iter().map(|s| s.amount).sum(),
            start_time: damage.first().map(|s| s.timestamp),
            end_time: damage.last().map(|s| s.timestamp),
            damage,
        }
    }

    /// Returns whether the listener dealt this damage.
    #[must_use]
    pub fn is_outgoing(&self) -> bool {
        self.attacker == "You"
    }
}

type StreamKey = (String, String);

struct EnemyRecord {
    ticker: String,
    ships: BTreeSet<String>,
}

fn push_sample(stream: &mut Vec<DamageSample>, entry: &CombatEntry) {
    match stream.last_mut() {
        Some(last) if last.timestamp == entry.timestamp => last.amount += entry.damage,
        _ => stream.push(DamageSample {
            timestamp: entry.timestamp,
            amount: entry.damage,
        }),
    }
}

/// Groups a log's combat entries into damage streams.
///
/// Streams of damage dealt by the listener come first, then streams of
/// damage received, each ordered by weapon and enemy name.
#[must_use]
pub fn extract_streams(log: &Log) -> Vec<DamageStream> {
    let mut outgoing: BTreeMap<StreamKey, Vec<DamageSample>> = BTreeMap::new();
    let mut incoming: BTreeMap<StreamKey, Vec<DamageSample>> = BTreeMap::new();
    let mut enemies: BTreeMap<String, EnemyRecord> = BTreeMap::new();

    for entry in log.combat_entries() {
        let is_outgoing = entry.attacker.trim().eq_ignore_ascii_case("you");
        let (streams, enemy) = if is_outgoing {
            (&mut outgoing, &entry.target)
        } else {
            (&mut incoming, &entry.attacker)
        };

        let info = enemy_info(enemy);
        let stream = streams
            .entry((entry.weapon.clone(), info.name.clone()))
            .or_default();
        push_sample(stream, entry);

        if let Some(ship) = info.ship {
            enemies
                .entry(info.name)
                .or_insert_with(|| EnemyRecord {
                    ticker: info.ticker.unwrap_or_default(),
                    ships: BTreeSet::new(),
                })
                .ships
                .insert(ship);
        }
    }

    let no_ships = BTreeSet::new();
    let build = |streams: BTreeMap<StreamKey, Vec<DamageSample>>, enemy_attacks: bool| {
        streams
            .into_iter()
            .map(|((weapon, enemy), samples)| {
                let (ticker, ships) = enemies
                    .get(&enemy)
                    .map_or((UNKNOWN.to_string(), &no_ships), |r| {
                        (r.ticker.clone(), &r.ships)
                    });
                let (attacker, target) = if enemy_attacks {
                    (enemy, "You".to_string())
                } else {
                    ("You".to_string(), enemy)
                };
                DamageStream::new(attacker, target, &weapon, ticker, ships, samples)
            })
            .collect::<Vec<_>>()
    };

    let mut result = build(outgoing, false);
    result.extend(build(incoming, true));
    result
}
