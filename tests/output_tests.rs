//! Output and Auxiliary Schedule Tests
//!
//! Restart and RFT output triggers, well retest policy, versioned lookup
//! tables and the global numerical controls.

use chrono::{NaiveDate, NaiveDateTime};
use well_schedule::deck::{
    DrsdtRecord, MnemonicRecord, TuningRecord, VapparsRecord, VfpRecord, WconinjeRecord,
    WconprodRecord, WelopenRecord, WelspecsRecord, WrftRecord, WrftpltRecord, WtestRecord,
};
use well_schedule::{
    DeckKeyword, EntityKind, OilVaporizationProperties, ScheduleBuilder, ScheduleConfig,
    ScheduleError, ScheduleEvent, VfpKind, WellTestReason,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

fn next_step(builder: &mut ScheduleBuilder, month: u32) {
    builder
        .apply(&DeckKeyword::Dates { dates: vec![date(2020, month, 1)] })
        .expect("dates should advance");
}

fn new_builder() -> ScheduleBuilder {
    ScheduleBuilder::new(date(2020, 1, 1), &ScheduleConfig::default())
}

fn welspecs(well: &str) -> DeckKeyword {
    DeckKeyword::Welspecs {
        records: vec![WelspecsRecord {
            well: well.to_string(),
            group: "G1".into(),
            head_i: Some(2),
            head_j: Some(2),
            ..Default::default()
        }],
    }
}

fn open_producer(well: &str) -> DeckKeyword {
    DeckKeyword::Wconprod {
        records: vec![WconprodRecord {
            well: well.to_string(),
            status: Some("OPEN".into()),
            cmode: Some("ORAT".into()),
            orat: Some(150.0),
            ..Default::default()
        }],
    }
}

fn mnemonics(items: &[&str]) -> MnemonicRecord {
    MnemonicRecord {
        mnemonics: items.iter().map(|s| (*s).to_string()).collect(),
    }
}

fn injection_table(table: i32, datum_depth: f64) -> DeckKeyword {
    DeckKeyword::Vfpinj(VfpRecord {
        table,
        datum_depth: Some(datum_depth),
        flow_values: vec![500.0, 1000.0],
        thp_values: vec![20.0, 40.0, 60.0],
        values: vec![150.0, 160.0, 170.0, 180.0, 190.0, 200.0],
        ..Default::default()
    })
}

// ============================================================================
// Restart Output
// ============================================================================

#[test]
fn restart_every_second_step_until_switched_off() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder
        .apply(&DeckKeyword::Rptrst(mnemonics(&["BASIC=3", "FREQ=2"])))
        .expect("rptrst");
    for month in 3..=6 {
        next_step(&mut builder, month);
    }
    builder
        .apply(&DeckKeyword::Rptsched(mnemonics(&["RESTART=0"])))
        .expect("rptsched");
    next_step(&mut builder, 7);
    let schedule = builder.finish();

    let due: Vec<bool> = (0..schedule.num_steps())
        .map(|s| schedule.write_restart(s).expect("in range"))
        .collect();
    assert_eq!(due, vec![false, true, false, true, false, false, false]);

    let policy = schedule.restart_policy(2).expect("in range");
    assert_eq!((policy.basic, policy.freq), (3, 2));
    assert_eq!(schedule.restart_policy(5).expect("in range").basic, 0);
    assert!(schedule.has_event(ScheduleEvent::OutputPolicyChange, 1));
    assert!(schedule.write_restart(99).is_err());
}

#[test]
fn rptsched_restart_and_integer_rptrst() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder
        .apply(&DeckKeyword::Rptsched(mnemonics(&["WELLS=2", "RESTART=2"])))
        .expect("rptsched");
    next_step(&mut builder, 3);
    builder.apply(&DeckKeyword::Rptrst(mnemonics(&["0"]))).expect("rptrst");
    let schedule = builder.finish();

    assert_eq!(schedule.restart_policy(1).expect("in range").basic, 1);
    assert!(schedule.write_restart(1).expect("in range"));
    assert!(!schedule.write_restart(2).expect("in range"));
}

#[test]
fn unknown_restart_rule_is_rejected() {
    let mut builder = new_builder();
    let result = builder.apply(&DeckKeyword::Rptrst(mnemonics(&["BASIC=7"])));
    assert!(matches!(result, Err(ScheduleError::InvalidArgument(_))));

    let garbage = builder.apply(&DeckKeyword::Rptrst(mnemonics(&["FREQ=often"])));
    assert!(matches!(garbage, Err(ScheduleError::MalformedRecord { .. })));
}

// ============================================================================
// RFT Output
// ============================================================================

#[test]
fn wrft_fires_once_at_the_request_step() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&welspecs("P1")).expect("welspecs");
    builder.apply(&open_producer("P1")).expect("wconprod");
    next_step(&mut builder, 3);
    builder
        .apply(&DeckKeyword::Wrft {
            records: vec![WrftRecord { well: "P1".into() }],
        })
        .expect("wrft");
    next_step(&mut builder, 4);
    let schedule = builder.finish();

    assert!(!schedule.output_schedule("P1", 1).expect("known well"));
    assert!(schedule.output_schedule("P1", 2).expect("known well"));
    assert!(!schedule.output_schedule("P1", 3).expect("known well"));
    assert_eq!(schedule.first_rft_output(), Some(2));
    assert!(matches!(
        schedule.output_schedule("NOPE", 2),
        Err(ScheduleError::UnknownEntity { kind: EntityKind::Well, .. })
    ));
}

#[test]
fn fopn_waits_for_the_first_open_step() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&welspecs("P2")).expect("welspecs");
    builder
        .apply(&DeckKeyword::Wrftplt {
            records: vec![WrftpltRecord {
                well: "P2".into(),
                output_rft: Some("FOPN".into()),
            }],
        })
        .expect("wrftplt");
    next_step(&mut builder, 3);
    next_step(&mut builder, 4);
    builder.apply(&open_producer("P2")).expect("wconprod");
    next_step(&mut builder, 5);
    let schedule = builder.finish();

    let due: Vec<bool> = (1..schedule.num_steps())
        .map(|s| schedule.output_schedule("P2", s).expect("known well"))
        .collect();
    assert_eq!(due, vec![false, false, true, false]);
    assert_eq!(schedule.first_rft_output(), Some(3));

    let reports = schedule.step_reports().expect("reports");
    assert_eq!(reports[3].rft_wells, vec!["P2"]);
    assert!(reports[4].rft_wells.is_empty());
}

#[test]
fn fopn_fires_on_reopening_a_well_that_was_open_before_the_request() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&welspecs("P1")).expect("welspecs");
    builder.apply(&open_producer("P1")).expect("wconprod");
    next_step(&mut builder, 3);
    builder
        .apply(&DeckKeyword::Welopen {
            records: vec![WelopenRecord {
                well: "P1".into(),
                status: Some("SHUT".into()),
                ..Default::default()
            }],
        })
        .expect("welopen");
    next_step(&mut builder, 4);
    builder
        .apply(&DeckKeyword::Wrftplt {
            records: vec![WrftpltRecord {
                well: "P1".into(),
                output_rft: Some("FOPN".into()),
            }],
        })
        .expect("wrftplt");
    next_step(&mut builder, 5);
    builder.apply(&open_producer("P1")).expect("wconprod");
    next_step(&mut builder, 6);
    let schedule = builder.finish();

    let due: Vec<bool> = (1..schedule.num_steps())
        .map(|s| schedule.output_schedule("P1", s).expect("known well"))
        .collect();
    assert_eq!(due, vec![false, false, false, true, false]);
    assert_eq!(schedule.first_rft_output(), Some(4));
}

#[test]
fn wrft_arms_first_open_output_for_wells_defined_later() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&welspecs("P1")).expect("welspecs");
    builder
        .apply(&DeckKeyword::Wrft {
            records: vec![WrftRecord { well: String::new() }],
        })
        .expect("wrft");
    next_step(&mut builder, 3);
    builder.apply(&welspecs("P2")).expect("welspecs");
    next_step(&mut builder, 4);
    builder.apply(&open_producer("P1")).expect("wconprod");
    builder.apply(&open_producer("P2")).expect("wconprod");
    next_step(&mut builder, 5);
    let schedule = builder.finish();

    for well in ["P1", "P2"] {
        assert!(!schedule.output_schedule(well, 2).expect("known well"));
        assert!(schedule.output_schedule(well, 3).expect("known well"), "{well} opens at step 3");
        assert!(!schedule.output_schedule(well, 4).expect("known well"));
    }
    assert_eq!(schedule.first_rft_output(), Some(3));
    assert_eq!(schedule.step_reports().expect("reports")[3].rft_wells, vec!["P1", "P2"]);
}

#[test]
fn no_rft_requests_means_no_rft_output() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&welspecs("P1")).expect("welspecs");
    builder.apply(&open_producer("P1")).expect("wconprod");
    let schedule = builder.finish();
    assert_eq!(schedule.first_rft_output(), None);
}

// ============================================================================
// Well Retest
// ============================================================================

#[test]
fn wtest_entries_follow_the_step_they_were_given() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&welspecs("P1")).expect("welspecs");
    builder
        .apply(&DeckKeyword::Wtest {
            records: vec![WtestRecord {
                well: "P1".into(),
                interval: Some(30.0),
                reasons: Some("PE".into()),
                num_tests: Some(3),
                startup_time: None,
            }],
        })
        .expect("wtest");
    next_step(&mut builder, 3);
    builder
        .apply(&DeckKeyword::Wtest {
            records: vec![WtestRecord {
                well: "P1".into(),
                reasons: Some(String::new()),
                ..Default::default()
            }],
        })
        .expect("wtest");
    let schedule = builder.finish();

    assert!(schedule.retest_policy(0).expect("in range").is_empty());

    let policy = schedule.retest_policy(1).expect("in range");
    assert!(policy.has("P1", WellTestReason::Physical));
    assert!(policy.has("P1", WellTestReason::Economic));
    assert!(!policy.has("P1", WellTestReason::Group));
    let entry = policy.get("P1").expect("entry");
    assert_eq!(entry.interval, 30.0);
    assert_eq!(entry.num_tests, 3);

    assert!(schedule.retest_policy(2).expect("in range").is_empty());
}

#[test]
fn wtest_rejects_unknown_reasons() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&welspecs("P1")).expect("welspecs");
    let result = builder.apply(&DeckKeyword::Wtest {
        records: vec![WtestRecord {
            well: "P1".into(),
            reasons: Some("PX".into()),
            ..Default::default()
        }],
    });
    assert!(matches!(result, Err(ScheduleError::MalformedRecord { .. })));
}

// ============================================================================
// Lookup Tables
// ============================================================================

#[test]
fn lookup_tables_are_versioned_by_step() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&injection_table(2, 2000.0)).expect("vfpinj");
    next_step(&mut builder, 3);
    next_step(&mut builder, 4);
    builder.apply(&injection_table(2, 2500.0)).expect("vfpinj");
    let schedule = builder.finish();

    assert!(matches!(
        schedule.lookup_table(VfpKind::Injection, 2, 0),
        Err(ScheduleError::UnknownEntity { kind: EntityKind::LookupTable, .. })
    ));
    let first = schedule.lookup_table(VfpKind::Injection, 2, 2).expect("defined");
    assert_eq!(first.datum_depth, 2000.0);
    assert_eq!(first.value(&[1, 2]), Some(200.0));
    let second = schedule.lookup_table(VfpKind::Injection, 2, 3).expect("defined");
    assert_eq!(second.datum_depth, 2500.0);

    // Production and injection numbers are separate
    assert!(schedule.lookup_table(VfpKind::Production, 2, 3).is_err());
    assert!(schedule.has_event(ScheduleEvent::VfpTableUpdate, 1));
    assert!(!schedule.has_event(ScheduleEvent::VfpTableUpdate, 2));
}

#[test]
fn injector_must_reference_a_defined_table() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder.apply(&welspecs("I1")).expect("welspecs");
    builder.apply(&injection_table(2, 2000.0)).expect("vfpinj");

    let wconinje = |table: i32| DeckKeyword::Wconinje {
        records: vec![WconinjeRecord {
            well: "I1".into(),
            injector_type: Some("WATER".into()),
            cmode: Some("RATE".into()),
            rate: Some(1000.0),
            vfp_table: Some(table),
            ..Default::default()
        }],
    };
    let missing = builder.apply(&wconinje(5));
    assert!(matches!(
        missing,
        Err(ScheduleError::UnknownEntity { kind: EntityKind::LookupTable, .. })
    ));
    builder.apply(&wconinje(2)).expect("table 2 exists");
    let schedule = builder.finish();

    let well = schedule.get_well("I1", 1).expect("exists");
    assert_eq!(well.injection.vfp_table, 2);
}

// ============================================================================
// Numerical Controls
// ============================================================================

#[test]
fn vaporization_policy_is_replaced_wholesale() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    builder
        .apply(&DeckKeyword::Drsdt(DrsdtRecord {
            max_rate: Some(0.0),
            option: Some("FREE".into()),
        }))
        .expect("drsdt");
    next_step(&mut builder, 3);
    builder
        .apply(&DeckKeyword::Vappars(VapparsRecord {
            oil_vap_propensity: Some(2.0),
            oil_density_propensity: Some(0.5),
        }))
        .expect("vappars");
    let schedule = builder.finish();

    assert_eq!(
        schedule.oil_vaporization(0).expect("in range"),
        OilVaporizationProperties::None
    );
    let drsdt = schedule.oil_vaporization(1).expect("in range");
    assert_eq!(drsdt.max_drsdt(), Some(0.0));
    assert_eq!(
        schedule.oil_vaporization(2).expect("in range"),
        OilVaporizationProperties::Vappars { vap1: 2.0, vap2: 0.5 }
    );
}

#[test]
fn drsdt_needs_a_rate() {
    let mut builder = new_builder();
    let result = builder.apply(&DeckKeyword::Drsdt(DrsdtRecord::default()));
    assert!(matches!(result, Err(ScheduleError::MalformedRecord { .. })));
}

#[test]
fn tuning_changes_from_its_step() {
    let mut builder = new_builder();
    next_step(&mut builder, 2);
    next_step(&mut builder, 3);
    builder
        .apply(&DeckKeyword::Tuning(TuningRecord {
            tsinit: Some(0.5),
            tsmaxz: Some(30.0),
            ..Default::default()
        }))
        .expect("tuning");
    let schedule = builder.finish();

    let before = schedule.tuning(1).expect("in range");
    assert_eq!(before.tsinit, 1.0);
    let after = schedule.tuning(2).expect("in range");
    assert_eq!(after.tsinit, 0.5);
    assert_eq!(after.tsmaxz, 30.0);
    assert_eq!(after.newtmx, 12);
    assert!(schedule.has_event(ScheduleEvent::TuningChange, 2));
    assert!(!schedule.has_event(ScheduleEvent::TuningChange, 1));
}
