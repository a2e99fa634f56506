//! Column Normalizer
//!
//! Maps localized and unit-suffixed header labels onto the canonical schema
//! (`name`, `thickness`, `elastic_modulus`, `density`, `tensile_strength`,
//! `shear_strength`, `index`). Labels are trimmed, looked up in a fixed
//! synonym table, and, failing that, looked up again with any unit suffix
//! (`/MPa`, `(m)`, `（m）`) removed. Unknown labels pass through trimmed.

use regex::Regex;
use std::sync::OnceLock;

/// Fixed synonym table: source label -> canonical label.
const COLUMN_SYNONYMS: &[(&str, &str)] = &[
    // name
    ("名称", "name"),
    ("岩性", "name"),
    ("岩石名称", "name"),
    ("layer_name", "name"),
    ("lithology", "name"),
    ("name", "name"),
    // thickness
    ("厚度", "thickness"),
    ("厚度/m", "thickness"),
    ("层厚", "thickness"),
    ("thickness", "thickness"),
    ("thickness_m", "thickness"),
    // elastic modulus
    ("弹性模量", "elastic_modulus"),
    ("弹性模量/Gpa", "elastic_modulus"),
    ("弹性模量/GPa", "elastic_modulus"),
    ("elastic_modulus", "elastic_modulus"),
    // density / unit weight
    ("容重", "density"),
    ("容重/kN*m-3", "density"),
    ("密度", "density"),
    ("unit_weight", "density"),
    ("density", "density"),
    // tensile strength
    ("抗拉强度", "tensile_strength"),
    ("抗拉强度/MPa", "tensile_strength"),
    ("tensile_strength", "tensile_strength"),
    // shear strength
    ("抗剪强度", "shear_strength"),
    ("抗剪强度/MPa", "shear_strength"),
    ("shear_strength", "shear_strength"),
    // sequence
    ("序号", "index"),
    ("index", "index"),
];

fn lookup(label: &str) -> Option<&'static str> {
    COLUMN_SYNONYMS
        .iter()
        .find(|(source, _)| *source == label)
        .map(|(_, canonical)| *canonical)
}

/// Matches a trailing unit annotation and captures the bare label.
fn unit_suffix() -> Option<&'static Regex> {
    static UNIT_SUFFIX: OnceLock<Option<Regex>> = OnceLock::new();
    UNIT_SUFFIX
        .get_or_init(|| Regex::new(r"^(?P<base>.+?)\s*(?:/.*|\(.*\)|（.*）)$").ok())
        .as_ref()
}

/// Normalize a single header label.
pub fn normalize_label(label: &str) -> String {
    let key = label.trim();
    if let Some(canonical) = lookup(key) {
        return canonical.to_string();
    }

    let stripped = unit_suffix()
        .and_then(|re| re.captures(key))
        .and_then(|caps| caps.name("base"))
        .map(|m| m.as_str().trim());
    if let Some(canonical) = stripped.and_then(lookup) {
        return canonical.to_string();
    }

    key.to_string()
}

/// Normalize a full header row, preserving order.
pub fn normalize_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels.iter().map(|l| normalize_label(l.as_ref())).collect()
}
