//! Group control modes, targets and the group snapshot

use super::guide_rate::GuideRate;
use super::state::Phase;
use serde::{Deserialize, Serialize};

// ============================================================================
// Production Control
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupProductionCMode {
    #[default]
    None,
    Orat,
    Wrat,
    Grat,
    Lrat,
    Crat,
    Resv,
    Prbl,
    /// Take the control from the parent group
    Fld,
}

impl GroupProductionCMode {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" | "" => Some(GroupProductionCMode::None),
            "ORAT" => Some(GroupProductionCMode::Orat),
            "WRAT" => Some(GroupProductionCMode::Wrat),
            "GRAT" => Some(GroupProductionCMode::Grat),
            "LRAT" => Some(GroupProductionCMode::Lrat),
            "CRAT" => Some(GroupProductionCMode::Crat),
            "RESV" => Some(GroupProductionCMode::Resv),
            "PRBL" => Some(GroupProductionCMode::Prbl),
            "FLD" => Some(GroupProductionCMode::Fld),
            _ => None,
        }
    }
}

/// Action taken when a group production limit is exceeded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum ExceedAction {
    #[default]
    None,
    Con,
    ConPlus,
    Well,
    Plug,
    Rate,
}

impl ExceedAction {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" | "" => Some(ExceedAction::None),
            "CON" => Some(ExceedAction::Con),
            "+CON" => Some(ExceedAction::ConPlus),
            "WELL" => Some(ExceedAction::Well),
            "PLUG" => Some(ExceedAction::Plug),
            "RATE" => Some(ExceedAction::Rate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GroupProductionControl {
    pub cmode: GroupProductionCMode,
    pub oil_target: Option<f64>,
    pub water_target: Option<f64>,
    pub gas_target: Option<f64>,
    pub liquid_target: Option<f64>,
    pub resv_target: Option<f64>,
    pub exceed_action: ExceedAction,
}

// ============================================================================
// Injection Control
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupInjectionCMode {
    #[default]
    None,
    Rate,
    Resv,
    Rein,
    Vrep,
    Fld,
}

impl GroupInjectionCMode {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" | "" => Some(GroupInjectionCMode::None),
            "RATE" => Some(GroupInjectionCMode::Rate),
            "RESV" => Some(GroupInjectionCMode::Resv),
            "REIN" => Some(GroupInjectionCMode::Rein),
            "VREP" => Some(GroupInjectionCMode::Vrep),
            "FLD" => Some(GroupInjectionCMode::Fld),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GroupInjectionControl {
    pub phase: Phase,
    pub cmode: GroupInjectionCMode,
    pub surface_target: Option<f64>,
    pub resv_target: Option<f64>,
    pub reinject_fraction: Option<f64>,
    pub voidage_fraction: Option<f64>,
}

// ============================================================================
// Group Snapshot
// ============================================================================

/// Effective state of a group at one report step.
///
/// Child groups and member wells are derived from the parent references in
/// force at the step and listed in creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub name: String,
    pub creation_step: usize,
    pub parent: Option<String>,
    pub child_groups: Vec<String>,
    pub wells: Vec<String>,
    pub production: GroupProductionControl,
    pub injection: GroupInjectionControl,
    pub guide_rate: GuideRate,
    pub efficiency_factor: f64,
    pub transfer_efficiency_to_network: bool,
}

impl Group {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_well(&self, name: &str) -> bool {
        self.wells.iter().any(|w| w == name)
    }

    pub fn has_child_group(&self, name: &str) -> bool {
        self.child_groups.iter().any(|g| g == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exceed_action_accepts_plus_con() {
        assert_eq!(ExceedAction::from_keyword("+CON"), Some(ExceedAction::ConPlus));
        assert_eq!(ExceedAction::from_keyword("con"), Some(ExceedAction::Con));
        assert_eq!(ExceedAction::from_keyword("SOMETIMES"), None);
    }

    #[test]
    fn defaulted_group_mode_is_none() {
        assert_eq!(
            GroupProductionCMode::from_keyword(""),
            Some(GroupProductionCMode::None)
        );
        assert_eq!(
            GroupInjectionCMode::from_keyword("vrep"),
            Some(GroupInjectionCMode::Vrep)
        );
    }
}
