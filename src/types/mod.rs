//! Shared data structures for schedule construction and queries
//!
//! - State enums: well status, connection state, phase, direction, role
//! - Control snapshots for producers and injectors
//! - Connections and the per-well connection set
//! - Group controls and the group snapshot
//! - Guide rates
//! - Change events

mod state;
mod controls;
mod connection;
mod guide_rate;
mod group;
mod well;
mod events;

pub use state::*;
pub use controls::*;
pub use connection::*;
pub use guide_rate::*;
pub use group::*;
pub use well::*;
pub use events::*;
