//! Schedule error kinds
//!
//! Construction-time errors abort the offending record before any of its
//! effects are committed. Query-time errors never touch built state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of entity a name or number refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Well,
    Group,
    WellList,
    LookupTable,
    Tracer,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Well => write!(f, "well"),
            EntityKind::Group => write!(f, "group"),
            EntityKind::WellList => write!(f, "well list"),
            EntityKind::LookupTable => write!(f, "lookup table"),
            EntityKind::Tracer => write!(f, "tracer"),
        }
    }
}

/// Errors raised while building or querying a schedule
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Unknown {kind}: {name}")]
    UnknownEntity { kind: EntityKind, name: String },

    #[error("Report step {step} is outside the timeline ({num_steps} steps)")]
    OutOfRange { step: usize, num_steps: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed {keyword} record: {message}")]
    MalformedRecord { keyword: String, message: String },
}

impl ScheduleError {
    pub fn unknown(kind: EntityKind, name: impl Into<String>) -> Self {
        ScheduleError::UnknownEntity {
            kind,
            name: name.into(),
        }
    }

    pub fn malformed(keyword: &str, message: impl Into<String>) -> Self {
        ScheduleError::MalformedRecord {
            keyword: keyword.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ScheduleError::InvalidArgument(message.into())
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
