//! Integration tests for whole-log parsing against the fixture logs.
//!
//! The `/logs/` directory holds one log per combat dialect plus logs that
//! must be rejected.

use std::io::Write;
use std::path::{Path, PathBuf};

use gamelog_parser::timestamp::format_timestamp;
use gamelog_parser::{Category, Dialect, Log, ParserError};

/// Path to the fixture directory relative to the crate root.
const LOGS_DIR: &str = "logs";

/// Returns the path to a specific fixture log.
fn log_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(LOGS_DIR).join(name)
}

/// Parses a fixture log, panicking with the error on failure.
fn parse_log(name: &str) -> Log {
    let path = log_path(name);
    Log::parse_file(&path).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

// ============================================================================
// Complex Dialect
// ============================================================================

#[test]
fn test_complex_log_header() {
    let log = parse_log("complex.txt");
    assert_eq!(log.listener(), Some("Some Pilot"));
    assert_eq!(format_timestamp(&log.start_time()), "2008.03.14 20:11:02");
    assert_eq!(log.dialect(), Dialect::Complex);
}

#[test]
fn test_complex_log_entries() {
    let log = parse_log("complex.txt");

    // The continuation line after the info entry is dropped.
    assert_eq!(log.num_entries(), 8);

    let counts = log.category_counts();
    assert_eq!(counts[&Category::Combat], 6);
    assert_eq!(counts[&Category::Notify], 1);
    assert_eq!(counts[&Category::Info], 1);
    assert_eq!(log.entries()[5].text(), "The loot is yours.");
}

#[test]
fn test_complex_log_combat() {
    let log = parse_log("complex.txt");
    let combat: Vec<_> = log.combat_entries().collect();
    assert_eq!(combat.len(), 6);

    assert_eq!(combat[0].attacker, "You");
    assert_eq!(combat[0].target, "Guristas Pithi");
    assert_eq!(combat[0].weapon, "Hobgoblin I");
    assert_eq!(combat[0].damage, 12.5);

    assert_eq!(combat[1].attacker, "Guristas Pithi");
    assert_eq!(combat[1].target, "you");
    assert!(combat[1].is_miss());

    assert_eq!(combat[2].attacker, "Guristas Pithi");
    assert_eq!(combat[2].weapon, "");
    assert_eq!(combat[2].damage, 3.1);

    assert_eq!(combat[3].weapon, "Hobgoblin I");
    assert!(combat[3].is_miss());

    assert_eq!(combat[4].weapon, "Hobgoblin I");
    assert_eq!(combat[4].damage, 30.0);

    assert_eq!(combat[5].attacker, "You");
    assert_eq!(combat[5].target, "Target Rat");
    assert_eq!(combat[5].weapon, "");
    assert_eq!(combat[5].damage, 12.5);
}

// ============================================================================
// Simplified Dialect
// ============================================================================

#[test]
fn test_simplified_log() {
    let log = parse_log("simplified.txt");
    assert_eq!(log.dialect(), Dialect::Simplified);
    assert_eq!(log.num_entries(), 10);

    let counts = log.category_counts();
    assert_eq!(counts[&Category::Combat], 7);
    assert_eq!(counts[&Category::Warning], 1);
    assert_eq!(counts[&Category::None], 1);

    let combat: Vec<_> = log.combat_entries().collect();
    assert_eq!(combat[0].weapon, "Hobgoblin I");
    assert_eq!(combat[0].damage, 112.0);

    assert_eq!(combat[1].weapon, "Light Missile");

    assert_eq!(combat[2].attacker, "Enemy Drone");
    assert_eq!(combat[2].target, "you");
    assert_eq!(combat[2].damage, 57.0);

    assert_eq!(combat[3].attacker, "You");
    assert_eq!(combat[3].target, "Enemy Frigate");
    assert_eq!(combat[3].weapon, "Missile");
    assert_eq!(combat[3].damage, 0.0);
}

// ============================================================================
// V3 Dialect
// ============================================================================

#[test]
fn test_v3_log() {
    let log = parse_log("v3.txt");
    assert_eq!(log.listener(), None);
    assert_eq!(log.dialect(), Dialect::V3);
    assert_eq!(log.num_entries(), 8);

    let combat: Vec<_> = log.combat_entries().collect();
    assert_eq!(combat.len(), 6);

    assert_eq!(combat[0].attacker, "You");
    assert_eq!(combat[0].weapon, "Hobgoblin II");
    assert_eq!(combat[0].damage, 94.0);

    assert_eq!(combat[2].attacker, "Guristas Pithi");
    assert_eq!(combat[2].target, "you");
    assert_eq!(combat[2].damage, 23.0);

    assert_eq!(combat[3].weapon, "Hobgoblin II");
    assert!(combat[3].is_miss());

    assert_eq!(combat[5].effect.as_deref(), Some("Warp scramble attempt"));
    assert_eq!(combat[5].damage, 0.0);
    assert!(!combat[5].is_miss());
}

#[test]
fn test_every_combat_entry_has_consistent_direction() {
    for name in ["complex.txt", "simplified.txt", "v3.txt"] {
        let log = parse_log(name);
        for hit in log.combat_entries() {
            if hit.target == "you" {
                assert!(hit.weapon.is_empty(), "{name}: {hit:?}");
            } else {
                assert_eq!(hit.attacker, "You", "{name}: {hit:?}");
            }
            assert!(hit.damage >= 0.0, "{name}: {hit:?}");
        }
    }
}

// ============================================================================
// Rejected Logs
// ============================================================================

#[test]
fn test_unparseable_first_combat_line() {
    let path = log_path("bad_dialect.txt");
    let err = Log::parse_file(&path).unwrap_err();

    match &err {
        ParserError::InFile { path: p, .. } => assert_eq!(p, &path),
        other => panic!("Expected InFile, got {other:?}"),
    }
    match err.root() {
        ParserError::DialectParse { dialect, text } => {
            assert_eq!(*dialect, Dialect::Unknown);
            assert_eq!(text, "Something unrecognizable happened to the ship");
        }
        other => panic!("Expected DialectParse, got {other:?}"),
    }
    assert!(err.to_string().contains("line 7"));
}

#[test]
fn test_bad_header() {
    let err = Log::parse_file(log_path("bad_header.txt")).unwrap_err();
    assert!(matches!(err.root(), ParserError::InvalidHeader { .. }));
    assert!(err.to_string().contains("Gamelog"));
}

#[test]
fn test_missing_file() {
    let err = Log::parse_file(log_path("no_such_log.txt")).unwrap_err();
    assert!(matches!(err.root(), ParserError::IoError(_)));
}

#[test]
fn test_dialect_mismatch_after_lock() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "---\nGamelog\nSession started: 2010.06.21 19:03:12\n---\n\
         [ 2010.06.21 19:04:35 ] (combat) Enemy Drone hits you for <b>57</b> damage\n\
         [ 2010.06.21 19:04:36 ] (combat) Your Hobgoblin I hits Guristas Pithi, doing 12.5 damage.\n"
    )
    .unwrap();

    let err = Log::parse_file(file.path()).unwrap_err();
    match err.root() {
        ParserError::DialectParse { dialect, .. } => assert_eq!(*dialect, Dialect::Simplified),
        other => panic!("Expected DialectParse, got {other:?}"),
    }
    assert!(err.to_string().contains("line 6"));
}

#[test]
fn test_unknown_category_is_fatal() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "---\nGamelog\nSession started: 2010.06.21 19:03:12\n---\n\
         [ 2010.06.21 19:04:35 ] (shout) Hello\n"
    )
    .unwrap();

    let err = Log::parse_file(file.path()).unwrap_err();
    assert!(matches!(err.root(), ParserError::UnknownCategory { tag } if tag == "shout"));
}

#[test]
fn test_log_serializes_to_json() {
    let log = parse_log("v3.txt");
    let json = serde_json::to_value(&log).unwrap();
    assert_eq!(json["dialect"], "V3");
    assert_eq!(json["entries"][0]["kind"], "combat");
    assert_eq!(json["entries"][0]["damage"], 94.0);
    assert_eq!(json["entries"][6]["kind"], "generic");
}
