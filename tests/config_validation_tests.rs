//! Config Validation Tests
//!
//! Typo detection and range validation, exercised through the public config
//! API independently from the rest of the pipeline.

use strata_grid::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use strata_grid::config::{ConfigError, StrataConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_interpolation_key_warns_with_suggestion() {
    let toml_str = r#"
[interpolation]
idw_powr = 2.5
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("idw_powr"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("interpolation.idw_power"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[evaluaton]
grid_size = 12
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field == "evaluaton"
        && w.suggestion.as_deref() == Some("evaluation")));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[data]
coordinates_file = "coords.csv"
extension = "csv"

[interpolation]
default_method = "linear"
default_grid_size = 60
min_grid_size = 20
max_grid_size = 120
padding_fraction = 0.1
idw_power = 2.0
idw_min_distance = 1e-9

[evaluation]
grid_size = 12
methods = ["idw", "nearest"]

[index.default_weights]
elastic_modulus = 1.0
tensile_strength = 1.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");

    let config = StrataConfig::from_toml_str(toml_str).expect("valid config should load");
    assert_eq!(config.data.coordinates_file, "coords.csv");
    assert_eq!(config.evaluation.methods, vec!["idw", "nearest"]);
    assert_eq!(config.interpolation_params().padding_fraction, 0.1);
}

#[test]
fn unknown_keys_do_not_block_loading() {
    let config = StrataConfig::from_toml_str("[interpolation]\ngridsize = 40\n")
        .expect("unknown keys only warn");
    assert_eq!(config, StrataConfig::default());
}

#[test]
fn garbage_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("zzzzzzzzzzzzzzzzzzzzzzzz", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn default_grid_size_outside_range_rejected() {
    let err = StrataConfig::from_toml_str("[interpolation]\ndefault_grid_size = 5\n").unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("default_grid_size")), "{errors:?}");
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn zero_min_distance_rejected() {
    let mut config = StrataConfig::default();
    config.interpolation.idw_min_distance = 0.0;
    let (errors, _) = validate_ranges(&config);
    assert!(errors.iter().any(|e| e.contains("idw_min_distance")));
}

#[test]
fn all_zero_weights_rejected() {
    let toml_str = r#"
[index.default_weights]
density = 0.0
"#;
    let err = StrataConfig::from_toml_str(toml_str).unwrap_err();
    assert!(err.to_string().contains("positive sum"), "{err}");
}

#[test]
fn unknown_evaluation_method_only_warns() {
    let mut config = StrataConfig::default();
    config.evaluation.methods.push("kriging".into());
    let (errors, warnings) = validate_ranges(&config);
    assert!(errors.is_empty());
    assert!(warnings.iter().any(|w| w.message.contains("kriging")));
}

#[test]
fn malformed_toml_is_parse_error() {
    let err = StrataConfig::from_toml_str("[interpolation\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}

#[test]
fn load_from_file_reads_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strata_config.toml");
    std::fs::write(&path, "[evaluation]\ngrid_size = 8\n").unwrap();
    let config = StrataConfig::load_from_file(&path).unwrap();
    assert_eq!(config.evaluation.grid_size, 8);
}
