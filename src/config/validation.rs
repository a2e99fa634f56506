//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// Weight tables take arbitrary property labels as keys.
const OPEN_TABLES: &[&str] = &["index.default_weights"];

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for StrataConfig.
///
/// Maintained by hand to match the struct hierarchy in strata_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [data]
        "data",
        "data.coordinates_file",
        "data.extension",
        // [interpolation]
        "interpolation",
        "interpolation.default_method",
        "interpolation.default_grid_size",
        "interpolation.min_grid_size",
        "interpolation.max_grid_size",
        "interpolation.padding_fraction",
        "interpolation.idw_power",
        "interpolation.idw_min_distance",
        // [evaluation]
        "evaluation",
        "evaluation.grid_size",
        "evaluation.methods",
        // [index]
        "index",
        "index.default_weights",
    ];
    keys.iter().copied().collect()
}

fn is_known(key: &str, known: &HashSet<&str>) -> bool {
    known.contains(key)
        || OPEN_TABLES
            .iter()
            .any(|t| key.strip_prefix(t).is_some_and(|rest| rest.starts_with('.')))
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve alphabetically so the suggestion is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut candidates: Vec<&str> = known.iter().copied().collect();
    candidates.sort_unstable();

    let mut best: Option<(&str, usize)> = None;
    for k in candidates {
        let dist = levenshtein(unknown, k);
        if dist <= 3 && best.map_or(true, |(_, d)| dist < d) {
            best = Some((k, dist));
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !is_known(key, &known))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate numeric ranges on a parsed StrataConfig.
///
/// Returns (errors, warnings). Errors are values the pipeline cannot work
/// with; warnings are legal but unusual.
pub fn validate_ranges(config: &super::StrataConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let i = &config.interpolation;

    if !i.padding_fraction.is_finite() || i.padding_fraction < 0.0 {
        errors.push(format!(
            "interpolation.padding_fraction = {} must be a finite value >= 0",
            i.padding_fraction
        ));
    } else if i.padding_fraction > 0.5 {
        warnings.push(ValidationWarning {
            field: "interpolation.padding_fraction".to_string(),
            message: format!(
                "padding_fraction = {:.2} pads the grid by more than half the data extent",
                i.padding_fraction
            ),
            suggestion: None,
        });
    }

    if !i.idw_power.is_finite() || i.idw_power <= 0.0 {
        errors.push(format!("interpolation.idw_power = {} must be > 0", i.idw_power));
    } else if !(1.0..=3.0).contains(&i.idw_power) {
        warnings.push(ValidationWarning {
            field: "interpolation.idw_power".to_string(),
            message: format!("idw_power = {:.2} is outside the usual range (1-3)", i.idw_power),
            suggestion: None,
        });
    }

    if !i.idw_min_distance.is_finite() || i.idw_min_distance <= 0.0 {
        errors.push(format!(
            "interpolation.idw_min_distance = {} must be > 0 (used as divisor floor)",
            i.idw_min_distance
        ));
    }

    if i.min_grid_size == 0 {
        errors.push("interpolation.min_grid_size must be > 0".to_string());
    }
    if i.min_grid_size > i.max_grid_size {
        errors.push(format!(
            "interpolation.min_grid_size ({}) must be <= max_grid_size ({})",
            i.min_grid_size, i.max_grid_size
        ));
    }
    if !(i.min_grid_size..=i.max_grid_size).contains(&i.default_grid_size) {
        errors.push(format!(
            "interpolation.default_grid_size ({}) must be within {}..={}",
            i.default_grid_size, i.min_grid_size, i.max_grid_size
        ));
    }
    if i.max_grid_size > crate::interpolation::GRID_SIZE_LIMIT {
        errors.push(format!(
            "interpolation.max_grid_size ({}) exceeds the hard limit {}",
            i.max_grid_size,
            crate::interpolation::GRID_SIZE_LIMIT
        ));
    } else if i.max_grid_size > 300 {
        warnings.push(ValidationWarning {
            field: "interpolation.max_grid_size".to_string(),
            message: format!(
                "max_grid_size = {} makes IDW grids slow (cost grows with the square)",
                i.max_grid_size
            ),
            suggestion: None,
        });
    }

    if i.default_method.parse::<crate::interpolation::Method>().is_err() {
        errors.push(format!(
            "interpolation.default_method '{}' is not one of idw, linear, nearest",
            i.default_method
        ));
    }

    if config.evaluation.grid_size < 2 {
        errors.push(format!(
            "evaluation.grid_size ({}) must be >= 2",
            config.evaluation.grid_size
        ));
    }
    if config.evaluation.methods.is_empty() {
        errors.push("evaluation.methods must list at least one method".to_string());
    }
    for m in &config.evaluation.methods {
        if m.parse::<crate::interpolation::Method>().is_err() {
            warnings.push(ValidationWarning {
                field: "evaluation.methods".to_string(),
                message: format!("evaluation method '{m}' is unknown and will score zero folds"),
                suggestion: None,
            });
        }
    }

    let weights = &config.index.default_weights;
    for (k, w) in weights {
        if !w.is_finite() || *w < 0.0 {
            errors.push(format!("index.default_weights.{k} = {w} must be a finite value >= 0"));
        }
    }
    if weights.values().filter(|w| w.is_finite()).sum::<f64>() <= 0.0 {
        errors.push("index.default_weights must have a positive sum".to_string());
    }

    if config.data.coordinates_file.trim().is_empty() {
        errors.push("data.coordinates_file must not be empty".to_string());
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrataConfig;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("padding_fracton", "padding_fraction"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("厚度", "厚"), 1);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [interpolation]
            idw_power = 2.0
            [index.default_weights]
            density = 1.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"interpolation".to_string()));
        assert!(keys.contains(&"interpolation.idw_power".to_string()));
        assert!(keys.contains(&"index.default_weights.density".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[interpolation]
padding_fracton = 0.1
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("interpolation.padding_fraction")
        );
    }

    #[test]
    fn test_weight_labels_are_not_unknown_keys() {
        let toml_str = r#"
[index.default_weights]
elastic_modulus = 0.5
shear_strength = 0.5
"#;
        assert!(validate_unknown_keys(toml_str).is_empty());
    }

    #[test]
    fn test_unknown_section_without_close_match() {
        let warnings = validate_unknown_keys("[completely_unrelated]\nx = 1\n");
        assert!(warnings.iter().any(|w| w.field == "completely_unrelated"));
        assert!(warnings.iter().all(|w| w.suggestion.is_none()));
    }

    #[test]
    fn test_defaults_clean() {
        let (errors, warnings) = validate_ranges(&StrataConfig::default());
        assert!(errors.is_empty(), "Defaults should produce no errors: {errors:?}");
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {warnings:?}");
    }

    #[test]
    fn test_inverted_grid_range_is_error() {
        let mut config = StrataConfig::default();
        config.interpolation.min_grid_size = 200;
        let (errors, _) = validate_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("min_grid_size")));
        assert!(errors.iter().any(|e| e.contains("default_grid_size")));
    }

    #[test]
    fn test_negative_weight_is_error() {
        let mut config = StrataConfig::default();
        config.index.default_weights.insert("density".into(), -1.0);
        let (errors, _) = validate_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("index.default_weights.density")));
    }

    #[test]
    fn test_unusual_power_is_warning() {
        let mut config = StrataConfig::default();
        config.interpolation.idw_power = 6.0;
        let (errors, warnings) = validate_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "interpolation.idw_power"));
    }

    #[test]
    fn test_unknown_default_method_is_error() {
        let mut config = StrataConfig::default();
        config.interpolation.default_method = "kriging".into();
        let (errors, _) = validate_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("default_method")));
    }
}
