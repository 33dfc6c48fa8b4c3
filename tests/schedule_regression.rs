//! Schedule Regression Tests
//!
//! End-to-end decks through `Schedule::from_deck`, asserting on well
//! existence, status flips at step boundaries, group lifetime and
//! determinism of the fold.

use chrono::{NaiveDate, NaiveDateTime};
use well_schedule::deck::{
    CompdatRecord, GruptreeRecord, WconprodRecord, WelopenRecord, WelspecsRecord,
};
use well_schedule::{
    Deck, DeckKeyword, EntityKind, Schedule, ScheduleConfig, ScheduleError, ScheduleEvent,
    WellStatus,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

fn dates(y: i32, m: u32, d: u32) -> DeckKeyword {
    DeckKeyword::Dates {
        dates: vec![date(y, m, d)],
    }
}

fn welspecs(wells: &[(&str, &str)]) -> DeckKeyword {
    DeckKeyword::Welspecs {
        records: wells
            .iter()
            .map(|(well, group)| WelspecsRecord {
                well: (*well).to_string(),
                group: (*group).to_string(),
                head_i: Some(5),
                head_j: Some(5),
                ..Default::default()
            })
            .collect(),
    }
}

fn build(deck: &Deck) -> Schedule {
    Schedule::from_deck(deck, &ScheduleConfig::default()).expect("deck should build")
}

/// One well at step 1, two more at step 3
fn three_well_deck() -> Deck {
    Deck::new(date(2020, 1, 1))
        .with(dates(2020, 2, 1))
        .with(welspecs(&[("W1", "G1")]))
        .with(dates(2020, 3, 1))
        .with(dates(2020, 4, 1))
        .with(welspecs(&[("W2", "G1"), ("W3", "G2")]))
}

/// Producer P1 with one connection, shut by a zero-qualifier WELOPEN at
/// step 2 and reopened by a defaulted one at step 3
fn shut_and_reopen_deck() -> Deck {
    Deck::new(date(2020, 1, 1))
        .with(dates(2020, 2, 1))
        .with(welspecs(&[("P1", "G1")]))
        .with(DeckKeyword::Compdat {
            records: vec![CompdatRecord {
                well: "P1".into(),
                k1: Some(1),
                k2: Some(1),
                ..Default::default()
            }],
        })
        .with(DeckKeyword::Wconprod {
            records: vec![WconprodRecord {
                well: "P1".into(),
                status: Some("OPEN".into()),
                cmode: Some("ORAT".into()),
                orat: Some(100.0),
                ..Default::default()
            }],
        })
        .with(dates(2020, 3, 1))
        .with(DeckKeyword::Welopen {
            records: vec![WelopenRecord {
                well: "P1".into(),
                status: Some("SHUT".into()),
                i: Some(0),
                j: Some(0),
                k: Some(0),
                c1: Some(0),
                c2: Some(0),
            }],
        })
        .with(dates(2020, 4, 1))
        .with(DeckKeyword::Welopen {
            records: vec![WelopenRecord {
                well: "P1".into(),
                ..Default::default()
            }],
        })
}

// ============================================================================
// Well existence
// ============================================================================

#[test]
fn well_count_follows_creation_steps() {
    let schedule = build(&three_well_deck());
    assert_eq!(schedule.num_steps(), 4);

    let counts: Vec<usize> = (0..4)
        .map(|s| schedule.num_wells(s).expect("step in range"))
        .collect();
    assert_eq!(counts, vec![0, 1, 1, 3]);
}

#[test]
fn existence_is_monotonic_from_creation() {
    let schedule = build(&three_well_deck());

    assert!(schedule.has_well("W2"));
    assert!(!schedule.has_well("W4"));
    for step in 0..3 {
        assert!(!schedule.has_well_at("W2", step), "W2 should not exist at {step}");
    }
    assert!(schedule.has_well_at("W2", 3));
    assert!(schedule.has_well_at("W1", 1));
    assert!(schedule.has_well_at("W1", 3));
}

#[test]
fn well_names_in_creation_order() {
    let schedule = build(&three_well_deck());
    assert_eq!(
        schedule.well_names(None, None).expect("valid"),
        vec!["W1", "W2", "W3"]
    );
    assert_eq!(schedule.well_names(None, Some(2)).expect("valid"), vec!["W1"]);
    assert_eq!(
        schedule.well_names(Some("W*"), Some(3)).expect("valid"),
        vec!["W1", "W2", "W3"]
    );
    assert!(schedule.well_names(Some("W3"), Some(1)).expect("valid").is_empty());
}

#[test]
fn get_well_error_kinds() {
    let schedule = build(&three_well_deck());

    assert!(matches!(
        schedule.get_well("NOPE", 1),
        Err(ScheduleError::UnknownEntity { kind: EntityKind::Well, .. })
    ));
    assert!(matches!(
        schedule.get_well("W1", 10),
        Err(ScheduleError::OutOfRange { step: 10, num_steps: 4 })
    ));
    // Defined only after the queried step
    assert!(matches!(
        schedule.get_well("W2", 1),
        Err(ScheduleError::UnknownEntity { .. })
    ));

    let w3 = schedule.get_well("W3", 3).expect("W3 exists at 3");
    assert_eq!(w3.group, "G2");
    assert_eq!((w3.head_i, w3.head_j), (4, 4));
    assert_eq!(w3.status, WellStatus::Shut);
}

// ============================================================================
// Status flips
// ============================================================================

#[test]
fn zero_qualifier_shut_then_default_reopen() {
    let schedule = build(&shut_and_reopen_deck());

    let status = |step| schedule.get_well("P1", step).expect("P1 exists").status;
    assert_eq!(status(1), WellStatus::Open);
    assert_eq!(status(2), WellStatus::Shut);
    assert_eq!(status(3), WellStatus::Open);

    // The connection itself was never touched
    let p1 = schedule.get_well("P1", 2).expect("P1 exists");
    assert_eq!(p1.connections.num_open(), 1);

    assert!(schedule.has_entity_event("P1", ScheduleEvent::WellStatusChange, 2));
    assert!(schedule.has_entity_event("P1", ScheduleEvent::WellStatusChange, 3));
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn group_exists_only_within_its_lifetime() {
    let deck = Deck::new(date(2020, 1, 1))
        .with(dates(2020, 2, 1))
        .with(dates(2020, 3, 1))
        .with(dates(2020, 4, 1))
        .with(DeckKeyword::Gruptree {
            records: vec![GruptreeRecord {
                child: "G1".into(),
                parent: "FIELD".into(),
            }],
        })
        .with(dates(2020, 5, 1));
    let schedule = build(&deck);

    assert!(!schedule.has_group("G1", 2));
    assert!(schedule.has_group("G1", 3));
    assert!(schedule.has_group("G1", 4));
    assert!(!schedule.has_group("G1", 1000));
    assert!(schedule.has_group("FIELD", 0));
    assert!(schedule.has_event(ScheduleEvent::NewGroup, 3));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn same_deck_builds_identical_schedules() {
    let deck = shut_and_reopen_deck();
    let a = build(&deck);
    let b = build(&deck);

    assert_eq!(a.num_steps(), b.num_steps());
    for step in 1..a.num_steps() {
        assert_eq!(
            a.get_well("P1", step).expect("exists"),
            b.get_well("P1", step).expect("exists")
        );
        assert_eq!(
            a.changed_entities(step).expect("in range"),
            b.changed_entities(step).expect("in range")
        );
    }
    assert_eq!(
        a.step_reports().expect("reports"),
        b.step_reports().expect("reports")
    );
}

#[test]
fn step_reports_cover_every_step() {
    let schedule = build(&shut_and_reopen_deck());
    let reports = schedule.step_reports().expect("reports");

    assert_eq!(reports.len(), schedule.num_steps());
    assert_eq!(reports[0].num_wells, 0);
    assert_eq!(reports[1].open_wells, vec!["P1"]);
    assert!(reports[2].open_wells.is_empty());
    assert_eq!(reports[3].time, date(2020, 4, 1));
    // FIELD and G1
    assert_eq!(reports[3].num_groups, 2);
}

// ============================================================================
// Deck files
// ============================================================================

#[test]
fn json_deck_from_disk() {
    let json = r#"{
        "start": "2020-01-01T00:00:00",
        "keywords": [
            { "keyword": "TSTEP", "days": [31.0] },
            { "keyword": "WELSPECS", "records": [
                { "well": "INJ1", "group": "G1", "head_i": 1, "head_j": 1 }
            ] },
            { "keyword": "COMPDAT", "records": [
                { "well": "INJ1", "k1": 1, "k2": 2 }
            ] },
            { "keyword": "WCONINJE", "records": [
                { "well": "INJ1", "injector_type": "WATER", "cmode": "RATE", "rate": 800.0 }
            ] },
            { "keyword": "TSTEP", "days": [30.0, 31.0] }
        ]
    }"#;
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("deck.json");
    std::fs::write(&path, json).expect("write deck");

    let deck = Deck::load_from_file(&path).expect("deck should load");
    let schedule = build(&deck);

    assert_eq!(schedule.num_steps(), 4);
    let inj = schedule.get_well("INJ1", 3).expect("INJ1 exists");
    assert!(inj.is_injector());
    assert!(inj.is_open());
    assert_eq!(inj.connections.len(), 2);
    assert_eq!(inj.injection.surface_rate, 800.0);
}
