//! Core state enums: well status, connection state, phase, direction

use serde::{Deserialize, Serialize};

// ============================================================================
// Well Status
// ============================================================================

/// Administrative status of a well at a report step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum WellStatus {
    Open,
    #[default]
    Shut,
    Stop,
    Auto,
}

impl WellStatus {
    /// Parse the deck spelling (`OPEN`, `SHUT`, `STOP`, `AUTO`)
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Some(WellStatus::Open),
            "SHUT" => Some(WellStatus::Shut),
            "STOP" => Some(WellStatus::Stop),
            "AUTO" => Some(WellStatus::Auto),
            _ => None,
        }
    }

    pub fn short_code(&self) -> &'static str {
        match self {
            WellStatus::Open => "OPEN",
            WellStatus::Shut => "SHUT",
            WellStatus::Stop => "STOP",
            WellStatus::Auto => "AUTO",
        }
    }
}

impl std::fmt::Display for WellStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_code())
    }
}

// ============================================================================
// Connection State
// ============================================================================

/// Open/shut state of a single perforation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectionState {
    #[default]
    Open,
    Shut,
    Auto,
}

impl ConnectionState {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Some(ConnectionState::Open),
            "SHUT" => Some(ConnectionState::Shut),
            "AUTO" => Some(ConnectionState::Auto),
            _ => None,
        }
    }

    /// Connection state implied by a well-level status word.
    ///
    /// `STOP` has no connection-level meaning and shuts the matched cells.
    pub fn from_well_status(status: WellStatus) -> Self {
        match status {
            WellStatus::Open => ConnectionState::Open,
            WellStatus::Auto => ConnectionState::Auto,
            WellStatus::Shut | WellStatus::Stop => ConnectionState::Shut,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Open => write!(f, "OPEN"),
            ConnectionState::Shut => write!(f, "SHUT"),
            ConnectionState::Auto => write!(f, "AUTO"),
        }
    }
}

// ============================================================================
// Phase
// ============================================================================

/// Fluid phase, used for preferred well phase and group injection phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    #[default]
    Oil,
    Water,
    Gas,
}

impl Phase {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OIL" => Some(Phase::Oil),
            "WATER" | "WAT" => Some(Phase::Water),
            "GAS" => Some(Phase::Gas),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Oil => write!(f, "OIL"),
            Phase::Water => write!(f, "WATER"),
            Phase::Gas => write!(f, "GAS"),
        }
    }
}

// ============================================================================
// Connection Direction
// ============================================================================

/// Penetration direction of a connection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum Direction {
    X,
    Y,
    #[default]
    Z,
}

impl Direction {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "X" => Some(Direction::X),
            "Y" => Some(Direction::Y),
            "Z" => Some(Direction::Z),
            _ => None,
        }
    }
}

// ============================================================================
// Well Role
// ============================================================================

/// A well is either a producer or an injector at any given step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum WellRole {
    #[default]
    Producer,
    Injector,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(WellStatus::from_keyword(" open "), Some(WellStatus::Open));
        assert_eq!(WellStatus::from_keyword("Stop"), Some(WellStatus::Stop));
        assert_eq!(WellStatus::from_keyword("BOGUS"), None);
    }

    #[test]
    fn stop_shuts_connections() {
        assert_eq!(
            ConnectionState::from_well_status(WellStatus::Stop),
            ConnectionState::Shut
        );
        assert_eq!(
            ConnectionState::from_well_status(WellStatus::Open),
            ConnectionState::Open
        );
    }

    #[test]
    fn default_well_status_is_shut() {
        assert_eq!(WellStatus::default(), WellStatus::Shut);
    }
}
