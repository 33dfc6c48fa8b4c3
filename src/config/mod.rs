//! Schedule Configuration Module
//!
//! Construction settings loaded from TOML: parse leniency, grid dimensions and
//! the name of the group hierarchy root.
//!
//! ## Loading Order
//!
//! 1. `WELL_SCHEDULE_CONFIG` environment variable (path to TOML file)
//! 2. `schedule_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The config is passed explicitly to the builder; there is no global instance.
//!
//! ```ignore
//! let config = ScheduleConfig::load();
//! let schedule = Schedule::from_deck(&deck, &config)?;
//! ```

mod schedule_config;
pub mod validation;

pub use schedule_config::*;
