//! Well production and injection control properties
//!
//! A control set is always rebuilt wholesale from the record that defines it:
//! limits absent from the record are not carried over from the previous step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Producer Control Modes
// ============================================================================

/// Rate or pressure channel a producer can be controlled on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProducerCMode {
    Orat,
    Wrat,
    Grat,
    Lrat,
    Crat,
    Resv,
    Bhp,
    Thp,
    Grup,
}

impl ProducerCMode {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ORAT" => Some(ProducerCMode::Orat),
            "WRAT" => Some(ProducerCMode::Wrat),
            "GRAT" => Some(ProducerCMode::Grat),
            "LRAT" => Some(ProducerCMode::Lrat),
            "CRAT" => Some(ProducerCMode::Crat),
            "RESV" => Some(ProducerCMode::Resv),
            "BHP" => Some(ProducerCMode::Bhp),
            "THP" => Some(ProducerCMode::Thp),
            "GRUP" => Some(ProducerCMode::Grup),
            _ => None,
        }
    }

    /// Whether a history-mode record may be driven on this channel
    pub fn is_history_rate_channel(&self) -> bool {
        matches!(
            self,
            ProducerCMode::Orat
                | ProducerCMode::Wrat
                | ProducerCMode::Grat
                | ProducerCMode::Lrat
                | ProducerCMode::Crat
                | ProducerCMode::Resv
                | ProducerCMode::Bhp
        )
    }
}

impl std::fmt::Display for ProducerCMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProducerCMode::Orat => "ORAT",
            ProducerCMode::Wrat => "WRAT",
            ProducerCMode::Grat => "GRAT",
            ProducerCMode::Lrat => "LRAT",
            ProducerCMode::Crat => "CRAT",
            ProducerCMode::Resv => "RESV",
            ProducerCMode::Bhp => "BHP",
            ProducerCMode::Thp => "THP",
            ProducerCMode::Grup => "GRUP",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// Production Properties
// ============================================================================

/// Producer control snapshot.
///
/// In prediction mode the rate fields are limits; in history mode they are the
/// observed rates that drive the well.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WellProductionProperties {
    pub oil_rate: f64,
    pub water_rate: f64,
    pub gas_rate: f64,
    pub liquid_rate: f64,
    /// Reservoir voidage rate; unset until a RESV target is given
    pub resv_rate: Option<f64>,
    pub bhp_limit: f64,
    pub thp_limit: f64,
    pub bhp_history: f64,
    pub thp_history: f64,
    pub vfp_table: u32,
    pub alq_value: f64,
    pub prediction_mode: bool,
    pub control_mode: Option<ProducerCMode>,
    pub controls: BTreeSet<ProducerCMode>,
}

impl WellProductionProperties {
    pub fn has_control(&self, cmode: ProducerCMode) -> bool {
        self.controls.contains(&cmode)
    }

    /// The limit value for an active control, `None` when the control is not set
    pub fn limit(&self, cmode: ProducerCMode) -> Option<f64> {
        if !self.has_control(cmode) {
            return None;
        }
        match cmode {
            ProducerCMode::Orat => Some(self.oil_rate),
            ProducerCMode::Wrat => Some(self.water_rate),
            ProducerCMode::Grat => Some(self.gas_rate),
            ProducerCMode::Lrat => Some(self.liquid_rate),
            ProducerCMode::Resv => self.resv_rate,
            ProducerCMode::Bhp => Some(self.bhp_limit),
            ProducerCMode::Thp => Some(self.thp_limit),
            ProducerCMode::Crat | ProducerCMode::Grup => None,
        }
    }

    /// Set a single target and make the control available
    pub fn set_target(&mut self, cmode: ProducerCMode, value: f64) {
        match cmode {
            ProducerCMode::Orat => self.oil_rate = value,
            ProducerCMode::Wrat => self.water_rate = value,
            ProducerCMode::Grat => self.gas_rate = value,
            ProducerCMode::Lrat => self.liquid_rate = value,
            ProducerCMode::Resv => self.resv_rate = Some(value),
            ProducerCMode::Bhp => self.bhp_limit = value,
            ProducerCMode::Thp => self.thp_limit = value,
            ProducerCMode::Crat | ProducerCMode::Grup => {}
        }
        self.controls.insert(cmode);
    }

    pub fn total_surface_rate(&self) -> f64 {
        self.oil_rate + self.water_rate + self.gas_rate
    }
}

// ============================================================================
// Injector Types and Control Modes
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum InjectorType {
    #[default]
    Water,
    Gas,
    Oil,
    Multi,
}

impl InjectorType {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "WATER" | "WAT" => Some(InjectorType::Water),
            "GAS" => Some(InjectorType::Gas),
            "OIL" => Some(InjectorType::Oil),
            "MULTI" => Some(InjectorType::Multi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum InjectorCMode {
    Rate,
    Resv,
    Bhp,
    Thp,
    Grup,
}

impl InjectorCMode {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "RATE" => Some(InjectorCMode::Rate),
            "RESV" => Some(InjectorCMode::Resv),
            "BHP" => Some(InjectorCMode::Bhp),
            "THP" => Some(InjectorCMode::Thp),
            "GRUP" => Some(InjectorCMode::Grup),
            _ => None,
        }
    }
}

impl std::fmt::Display for InjectorCMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InjectorCMode::Rate => "RATE",
            InjectorCMode::Resv => "RESV",
            InjectorCMode::Bhp => "BHP",
            InjectorCMode::Thp => "THP",
            InjectorCMode::Grup => "GRUP",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// Injection Properties
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WellInjectionProperties {
    pub injector_type: InjectorType,
    pub surface_rate: f64,
    pub reservoir_rate: f64,
    pub bhp_limit: f64,
    pub thp_limit: f64,
    pub bhp_history: f64,
    pub thp_history: f64,
    pub vfp_table: u32,
    pub prediction_mode: bool,
    pub control_mode: Option<InjectorCMode>,
    pub controls: BTreeSet<InjectorCMode>,
}

impl WellInjectionProperties {
    pub fn has_control(&self, cmode: InjectorCMode) -> bool {
        self.controls.contains(&cmode)
    }

    pub fn limit(&self, cmode: InjectorCMode) -> Option<f64> {
        if !self.has_control(cmode) {
            return None;
        }
        match cmode {
            InjectorCMode::Rate => Some(self.surface_rate),
            InjectorCMode::Resv => Some(self.reservoir_rate),
            InjectorCMode::Bhp => Some(self.bhp_limit),
            InjectorCMode::Thp => Some(self.thp_limit),
            InjectorCMode::Grup => None,
        }
    }

    pub fn set_target(&mut self, cmode: InjectorCMode, value: f64) {
        match cmode {
            InjectorCMode::Rate => self.surface_rate = value,
            InjectorCMode::Resv => self.reservoir_rate = value,
            InjectorCMode::Bhp => self.bhp_limit = value,
            InjectorCMode::Thp => self.thp_limit = value,
            InjectorCMode::Grup => {}
        }
        self.controls.insert(cmode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_none_without_control() {
        let mut props = WellProductionProperties::default();
        props.oil_rate = 500.0;
        assert_eq!(props.limit(ProducerCMode::Orat), None);

        props.set_target(ProducerCMode::Orat, 750.0);
        assert_eq!(props.limit(ProducerCMode::Orat), Some(750.0));
    }

    #[test]
    fn resv_limit_is_unset_until_targeted() {
        let mut props = WellProductionProperties::default();
        props.controls.insert(ProducerCMode::Resv);
        assert_eq!(props.limit(ProducerCMode::Resv), None);

        props.set_target(ProducerCMode::Resv, 1200.0);
        assert_eq!(props.limit(ProducerCMode::Resv), Some(1200.0));
    }

    #[test]
    fn history_channels_exclude_thp_and_grup() {
        assert!(ProducerCMode::Resv.is_history_rate_channel());
        assert!(!ProducerCMode::Thp.is_history_rate_channel());
        assert!(!ProducerCMode::Grup.is_history_rate_channel());
    }

    #[test]
    fn injector_target_adds_control() {
        let mut inj = WellInjectionProperties::default();
        inj.set_target(InjectorCMode::Bhp, 350.0);
        assert!(inj.has_control(InjectorCMode::Bhp));
        assert_eq!(inj.limit(InjectorCMode::Rate), None);
    }
}
