//! Well Schedule: reservoir simulation schedule engine
//!
//! Builds the time-indexed state of wells, completions and groups from the
//! schedule section of a simulation deck, and answers per-step queries.
//!
//! ## Architecture
//!
//! - **Deck**: keyword records in deck order, loaded from JSON
//! - **Builder**: folds each record into per-entity timelines
//! - **Schedule**: immutable view with well, group, table and output queries
//! - **Config**: TOML construction settings (leniency, grid, hierarchy root)

pub mod config;
pub mod deck;
pub mod error;
pub mod schedule;
pub mod types;

// Re-export configuration
pub use config::ScheduleConfig;

// Re-export the deck model
pub use deck::{Deck, DeckError, DeckKeyword};

// Re-export errors
pub use error::{EntityKind, ScheduleError, ScheduleResult};

// Re-export schedule construction and queries
pub use schedule::{
    OilVaporizationProperties, RestartPolicy, RftMode, Schedule, ScheduleBuilder, StepReport,
    TimeMap, TuningParameters, VfpKind, VfpTable, WellTestConfig, WellTestReason,
};

// Re-export commonly used types
pub use types::{
    Connection, ConnectionState, Group, GroupInjectionControl, GroupProductionControl,
    ScheduleEvent, Well, WellConnections, WellStatus,
};
