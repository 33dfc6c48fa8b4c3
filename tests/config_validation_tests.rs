//! Config Validation Tests
//!
//! Typo detection, range validation and provenance for the TOML
//! construction config, plus the effect of the config on a built schedule.

use chrono::NaiveDate;
use well_schedule::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use well_schedule::config::{ConfigError, LeniencyAction, ScheduleConfig};
use well_schedule::{Deck, Schedule};

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("schedule_config.toml");
    std::fs::write(&path, contents).expect("write config");
    (dir, path)
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_grid_section_warns_with_suggestion() {
    let toml_str = r#"
[grid]
nxx = 10
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "grid.nxx");
    assert_eq!(warnings[0].suggestion.as_deref(), Some("grid.nx"));
    assert!(warnings[0].to_string().contains("did you mean 'grid.nx'"));
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[grups]
root = "FIELD"
"#;
    let warnings = validate_unknown_keys(toml_str);
    let fields: Vec<&str> = warnings.iter().map(|w| w.field.as_str()).collect();
    assert!(fields.contains(&"grups"));
    assert!(fields.contains(&"grups.root"));
    let section = warnings.iter().find(|w| w.field == "grups").expect("section warning");
    assert_eq!(section.suggestion.as_deref(), Some("groups"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[parse]
wgname_space = "warn"
unsupported_whistctl_terminate = "ignore"

[grid]
nx = 40
ny = 60
nz = 12

[groups]
root = "FIELD"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
}

#[test]
fn unrelated_keys_get_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("completely_unrelated_section", &known).is_none());
    assert_eq!(
        suggest_correction("parse.wgname_spaces", &known).as_deref(),
        Some("parse.wgname_space")
    );
}

#[test]
fn unknown_keys_never_fail_a_load() {
    let (config, _) = ScheduleConfig::from_toml_str(
        r#"
[grid]
nx = 10
legacy_option = true
"#,
    )
    .expect("unknown keys only warn");
    assert_eq!(config.grid.nx, 10);
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn zero_grid_dimension_is_rejected() {
    let err = ScheduleConfig::from_toml_str("[grid]\nnz = 0\n").expect_err("nz = 0 is invalid");
    match err {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("grid.nz")), "{errors:?}");
        }
        other => panic!("expected a validation error, got {other}"),
    }
}

#[test]
fn root_name_must_be_a_single_token() {
    for root in ["", "   ", "MY FIELD"] {
        let toml_str = format!("[groups]\nroot = \"{root}\"\n");
        let result = ScheduleConfig::from_toml_str(&toml_str);
        assert!(
            matches!(result, Err(ConfigError::Validation(_))),
            "root '{root}' should be rejected"
        );
    }
}

#[test]
fn defaults_are_valid() {
    let config = ScheduleConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.groups.root, "FIELD");
    assert_eq!(config.parse.wgname_space, LeniencyAction::Error);
    assert_eq!(config.parse.unsupported_whistctl_terminate, LeniencyAction::Warn);
    assert_eq!((config.grid.nx, config.grid.ny, config.grid.nz), (100, 100, 100));
}

// ============================================================================
// Files and Provenance
// ============================================================================

#[test]
fn provenance_distinguishes_user_set_keys() {
    let (_dir, path) = write_config(
        r#"
[parse]
wgname_space = "warn"

[grid]
nx = 20
"#,
    );
    let (config, provenance) =
        ScheduleConfig::load_from_file_with_provenance(&path).expect("config should load");

    assert_eq!(config.parse.wgname_space, LeniencyAction::Warn);
    assert_eq!(config.grid.nx, 20);
    assert_eq!(config.grid.ny, 100);
    assert!(provenance.is_user_set("grid.nx"));
    assert!(provenance.is_user_set("parse.wgname_space"));
    assert!(!provenance.is_user_set("grid.ny"));
    assert!(!provenance.is_user_set("groups.root"));
}

#[test]
fn parse_errors_name_the_file() {
    let (_dir, path) = write_config("[grid]\nnx = \"ten\"\n");
    match ScheduleConfig::load_from_file(&path) {
        Err(ConfigError::Parse(p, _)) => assert_eq!(p, path),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = ScheduleConfig::load_from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(..))));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("saved.toml");
    let mut config = ScheduleConfig::default();
    config.groups.root = "TOP".to_string();
    config.parse.unsupported_whistctl_terminate = LeniencyAction::Error;
    config.save_to_file(&path).expect("save");

    let loaded = ScheduleConfig::load_from_file(&path).expect("load");
    assert_eq!(loaded, config);
}

// ============================================================================
// Config in Use
// ============================================================================

#[test]
fn root_group_name_comes_from_config() {
    let (config, _) = ScheduleConfig::from_toml_str("[groups]\nroot = \"TOP\"\n").expect("valid");
    let start = NaiveDate::from_ymd_opt(2021, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date");
    let schedule = Schedule::from_deck(&Deck::new(start), &config).expect("empty deck builds");

    assert_eq!(schedule.root_group(), "TOP");
    assert!(schedule.has_group("TOP", 0));
    assert!(!schedule.has_group("FIELD", 0));
    assert_eq!(schedule.num_steps(), 1);
}
