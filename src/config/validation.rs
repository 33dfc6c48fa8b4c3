//! Config validation: unknown-key detection with Levenshtein suggestions
//! and grid range checks.
//!
//! The raw TOML is first walked as a `toml::Value` tree and compared against
//! the known key paths, producing "did you mean?" warnings. Serde
//! deserialization follows. Unknown keys never fail a load.

use std::collections::HashSet;

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
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Valid dotted key paths for `ScheduleConfig`.
///
/// Kept in step with the structs in schedule_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    [
        // [parse]
        "parse",
        "parse.wgname_space",
        "parse.unsupported_whistctl_terminate",
        // [grid]
        "grid",
        "grid.nx",
        "grid.ny",
        "grid.nz",
        // [groups]
        "groups",
        "groups.root",
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect all dotted key paths of a TOML tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };
    let mut keys = Vec::new();
    for (k, v) in table {
        let path = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        if v.is_table() {
            keys.push(path.clone());
            keys.extend(walk_toml_keys(v, &path));
        } else {
            keys.push(path);
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

/// Closest known key within edit distance 3
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Warnings for any unknown config keys in a raw TOML string.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        // parse errors are reported by serde
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Grid Range Validation
// ============================================================================

/// Cell count above which a grid is reported as suspicious
const LARGE_GRID_CELLS: usize = 500_000_000;

/// Returns (errors, warnings) for the grid section.
pub fn validate_grid_ranges(
    config: &super::ScheduleConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let g = &config.grid;

    for (name, value) in [("grid.nx", g.nx), ("grid.ny", g.ny), ("grid.nz", g.nz)] {
        if value == 0 {
            errors.push(format!("{name} must be > 0"));
        }
    }

    match g.num_cells() {
        None => errors.push(format!(
            "grid {}x{}x{} overflows the cell index",
            g.nx, g.ny, g.nz
        )),
        Some(cells) if cells > LARGE_GRID_CELLS => warnings.push(ValidationWarning {
            field: "grid".to_string(),
            message: format!("grid has {cells} cells, which is unusually large"),
            suggestion: None,
        }),
        Some(_) => {}
    }

    (errors, warnings)
}
