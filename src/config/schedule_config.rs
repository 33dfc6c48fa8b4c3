//! Schedule Configuration - leniency policy, grid dimensions, hierarchy root
//!
//! Every field has a default, so an empty or partial TOML file is valid and a
//! missing file falls back to built-in values.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "WELL_SCHEDULE_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "schedule_config.toml";

// ============================================================================
// Config Provenance: which keys the user explicitly set
// ============================================================================

/// Tracks which configuration keys were explicitly present in the user's TOML file.
///
/// After deserialization every `#[serde(default)]` field has a value whether or
/// not the user wrote it; this keeps the distinction.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvenance {
    /// Dotted key paths explicitly present in the user's TOML file
    pub explicit_keys: HashSet<String>,
}

impl ConfigProvenance {
    /// Example: `provenance.is_user_set("parse.wgname_space")`
    pub fn is_user_set(&self, dotted_key: &str) -> bool {
        self.explicit_keys.contains(dotted_key)
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for schedule construction.
///
/// Load with `ScheduleConfig::load()` which searches:
/// 1. `$WELL_SCHEDULE_CONFIG` env var
/// 2. `./schedule_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScheduleConfig {
    /// Leniency policy for naming and unsupported-item violations
    #[serde(default)]
    pub parse: ParseConfig,

    /// Grid dimensions used for connection indexing
    #[serde(default)]
    pub grid: GridConfig,

    /// Group hierarchy settings
    #[serde(default)]
    pub groups: GroupsConfig,
}

impl ScheduleConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WELL_SCHEDULE_CONFIG` environment variable
    /// 2. `./schedule_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        Self::load_with_provenance().0
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let (config, _provenance) = Self::load_from_file_with_provenance(path)?;
        Ok(config)
    }

    /// Load from a specific TOML file path, also returning provenance
    /// so callers can distinguish user-set values from defaults.
    pub fn load_from_file_with_provenance(
        path: &Path,
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings before deserialization and never
    /// fail the load.
    pub fn from_toml_str(contents: &str) -> Result<(Self, ConfigProvenance), ConfigError> {
        let typo_warnings = super::validation::validate_unknown_keys(contents);
        for w in &typo_warnings {
            warn!("{}", w);
        }

        let provenance = ConfigProvenance {
            explicit_keys: contents
                .parse::<toml::Value>()
                .map(|v| super::validation::walk_toml_keys(&v, ""))
                .unwrap_or_default()
                .into_iter()
                .collect(),
        };

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok((config, provenance))
    }

    /// Load configuration using standard search order, returning provenance.
    pub fn load_with_provenance() -> (Self, ConfigProvenance) {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file_with_provenance(&p) {
                    Ok((config, provenance)) => {
                        info!(path = %p.display(), root = %config.groups.root, "Loaded schedule config from {}", CONFIG_ENV_VAR);
                        return (config, provenance);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./schedule_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file_with_provenance(&local) {
                Ok((config, provenance)) => {
                    info!(root = %config.groups.root, "Loaded schedule config from ./{}", LOCAL_CONFIG_FILE);
                    return (config, provenance);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults, nothing is user-set
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        (Self::default(), ConfigProvenance::default())
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Schedule config saved");
        Ok(())
    }

    /// Validate the config for internal consistency.
    ///
    /// Rules:
    /// - Grid dimensions must be > 0 and their product must fit a cell index
    /// - The hierarchy root must be a non-empty name without whitespace
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let root = &self.groups.root;
        if root.trim().is_empty() {
            errors.push("groups.root must not be empty".to_string());
        } else if root.chars().any(char::is_whitespace) {
            errors.push(format!("groups.root '{root}' must not contain whitespace"));
        }

        let (range_errors, range_warnings) = super::validation::validate_grid_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Parse Leniency
// ============================================================================

/// What to do when a record breaks a naming convention or asks for an
/// unsupported option
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LeniencyAction {
    /// Reject the record with `InvalidArgument`
    #[default]
    Error,
    /// Log and keep the value as given
    Warn,
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseConfig {
    /// Well or group names with embedded whitespace
    #[serde(default)]
    pub wgname_space: LeniencyAction,

    /// `WHISTCTL` asking to terminate the run on a BHP violation
    #[serde(default = "default_whistctl_terminate")]
    pub unsupported_whistctl_terminate: LeniencyAction,
}

fn default_whistctl_terminate() -> LeniencyAction {
    LeniencyAction::Warn
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            wgname_space: LeniencyAction::Error,
            unsupported_whistctl_terminate: default_whistctl_terminate(),
        }
    }
}

// ============================================================================
// Grid
// ============================================================================

/// Cartesian grid dimensions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridConfig {
    #[serde(default = "default_dim")]
    pub nx: usize,
    #[serde(default = "default_dim")]
    pub ny: usize,
    #[serde(default = "default_dim")]
    pub nz: usize,
}

fn default_dim() -> usize {
    100
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: default_dim(),
            ny: default_dim(),
            nz: default_dim(),
        }
    }
}

impl GridConfig {
    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.nx && j < self.ny && k < self.nz
    }

    /// Natural-order cell index `i + j*nx + k*nx*ny`
    pub fn global_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.nx + k * self.nx * self.ny
    }

    pub fn num_cells(&self) -> Option<usize> {
        self.nx.checked_mul(self.ny)?.checked_mul(self.nz)
    }
}

// ============================================================================
// Groups
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupsConfig {
    /// Name of the hierarchy root
    #[serde(default = "default_root")]
    pub root: String,
}

fn default_root() -> String {
    "FIELD".to_string()
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = ScheduleConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: ScheduleConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, ScheduleConfig::default());
        assert_eq!(config.groups.root, "FIELD");
        assert_eq!(config.parse.wgname_space, LeniencyAction::Error);
        assert_eq!(config.parse.unsupported_whistctl_terminate, LeniencyAction::Warn);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[parse]
wgname_space = "warn"

[grid]
nx = 20
"#;
        let (config, provenance) =
            ScheduleConfig::from_toml_str(toml_str).expect("partial TOML should load");
        assert_eq!(config.parse.wgname_space, LeniencyAction::Warn);
        assert_eq!(config.grid.nx, 20);
        assert_eq!(config.grid.ny, 100);
        assert!(provenance.is_user_set("grid.nx"));
        assert!(!provenance.is_user_set("grid.ny"));
    }

    #[test]
    fn test_validation_catches_zero_dimension() {
        let mut config = ScheduleConfig::default();
        config.grid.nz = 0;
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Validation(ref e)) if e.iter().any(|m| m.contains("grid.nz"))));
    }

    #[test]
    fn test_validation_catches_bad_root() {
        let mut config = ScheduleConfig::default();
        config.groups.root = "MY FIELD".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_global_index_is_natural_order() {
        let grid = GridConfig { nx: 10, ny: 5, nz: 3 };
        assert_eq!(grid.global_index(0, 0, 0), 0);
        assert_eq!(grid.global_index(2, 1, 0), 12);
        assert_eq!(grid.global_index(2, 1, 2), 112);
        assert!(grid.contains(9, 4, 2));
        assert!(!grid.contains(10, 0, 0));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("schedule_config.toml");
        let mut config = ScheduleConfig::default();
        config.groups.root = "FLD".to_string();
        config.save_to_file(&path).expect("save");
        let loaded = ScheduleConfig::load_from_file(&path).expect("reload");
        assert_eq!(loaded, config);
    }
}
