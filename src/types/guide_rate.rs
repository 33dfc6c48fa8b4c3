//! Guide rates used to split group targets among members

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum GuideRatePhase {
    #[default]
    Undefined,
    Oil,
    Water,
    Gas,
    Liquid,
    Comb,
    Wga,
    Cval,
    Rat,
    Res,
    Void,
    Netv,
    Injv,
    Potn,
}

impl GuideRatePhase {
    /// Parse a guide rate phase, including the group-level definitions of
    /// `GUIDE_RATE_DEF`. `FORM` is not a phase and is handled by the caller.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "" => Some(GuideRatePhase::Undefined),
            "OIL" => Some(GuideRatePhase::Oil),
            "WAT" | "WATER" => Some(GuideRatePhase::Water),
            "GAS" => Some(GuideRatePhase::Gas),
            "LIQ" | "LIQUID" => Some(GuideRatePhase::Liquid),
            "COMB" => Some(GuideRatePhase::Comb),
            "WGA" => Some(GuideRatePhase::Wga),
            "CVAL" => Some(GuideRatePhase::Cval),
            "RAT" | "RATE" => Some(GuideRatePhase::Rat),
            "RES" | "RESV" => Some(GuideRatePhase::Res),
            "VOID" => Some(GuideRatePhase::Void),
            "NETV" => Some(GuideRatePhase::Netv),
            "INJV" => Some(GuideRatePhase::Injv),
            "POTN" => Some(GuideRatePhase::Potn),
            _ => None,
        }
    }
}

/// Guide rate configuration for one well or group.
///
/// `value == None` means no explicit weight; the default value is returned for
/// entities that never received a guide rate record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuideRate {
    pub phase: GuideRatePhase,
    pub value: Option<f64>,
    pub scaling_factor: f64,
    pub auto_recalculate: bool,
}

impl Default for GuideRate {
    fn default() -> Self {
        Self {
            phase: GuideRatePhase::Undefined,
            value: None,
            scaling_factor: 1.0,
            auto_recalculate: false,
        }
    }
}

impl GuideRate {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
