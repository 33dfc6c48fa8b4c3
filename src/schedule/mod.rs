//! Schedule construction and queries
//!
//! `ScheduleBuilder` folds deck keywords into per-entity timelines;
//! `finish()` yields the immutable `Schedule`, which answers per-step
//! questions about wells, groups, lookup tables and output policies.
//!
//! ## Layout
//!
//! - `dynamic_state`: step-indexed override container used for every attribute
//! - `time_map`: report step dates
//! - `builder`: keyword dispatch, name resolution, item parsing helpers
//! - `wells`, `well_controls`, `connections`: well keywords
//! - `groups`: group tree and group controls
//! - `output`, `well_test`, `vfp`, `numerics`: global and auxiliary schedules
//! - `view`: the read-only `Schedule`

mod builder;
mod connections;
mod dynamic_state;
mod events;
mod groups;
mod name_pattern;
mod numerics;
mod output;
mod time_map;
mod vfp;
mod view;
mod well_controls;
mod wells;

pub use builder::ScheduleBuilder;
pub use dynamic_state::DynamicState;
pub use events::EventLog;
pub use name_pattern::{NamePattern, WellLists, WlistAction};
pub use numerics::{OilVaporizationProperties, TuningParameters};
pub use output::{RestartPolicy, RftMode};
pub use time_map::TimeMap;
pub use vfp::{VfpKind, VfpTable};
pub use view::{Schedule, StepReport};
pub use well_test::{WellTestConfig, WellTestEntry, WellTestReason};

/// Index of a well in the builder's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WellId(pub(crate) usize);

/// Index of a group in the builder's arena; the root is always 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);
