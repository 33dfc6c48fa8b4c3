//! Well snapshot and auxiliary per-well properties

use super::connection::WellConnections;
use super::controls::{InjectorType, WellInjectionProperties, WellProductionProperties};
use super::guide_rate::GuideRate;
use super::state::{Phase, WellRole, WellStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Auxiliary Properties
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WellPolymerProperties {
    pub polymer_concentration: f64,
    pub salt_concentration: f64,
}

/// Thermal, tracer, foam, polymer and solvent settings of a well.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WellAuxProperties {
    pub polymer: WellPolymerProperties,
    pub solvent_fraction: f64,
    pub tracer_concentrations: BTreeMap<String, f64>,
    pub foam_concentration: f64,
    pub injection_temperature: Option<f64>,
}

impl WellAuxProperties {
    pub fn tracer(&self, name: &str) -> f64 {
        self.tracer_concentrations.get(name).copied().unwrap_or(0.0)
    }
}

// ============================================================================
// Well Snapshot
// ============================================================================

/// Effective state of a well at one report step.
///
/// Both control snapshots are carried; `role` says which one is active. The
/// inactive one is always the default value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Well {
    pub name: String,
    pub creation_step: usize,
    pub head_i: usize,
    pub head_j: usize,
    pub ref_depth: Option<f64>,
    pub group: String,
    pub preferred_phase: Phase,
    pub allow_crossflow: bool,
    pub status: WellStatus,
    pub role: WellRole,
    pub production: WellProductionProperties,
    pub injection: WellInjectionProperties,
    pub efficiency_factor: f64,
    pub connections: WellConnections,
    pub guide_rate: GuideRate,
    pub available_for_group_control: bool,
    pub aux: WellAuxProperties,
}

impl Well {
    pub fn is_producer(&self) -> bool {
        self.role == WellRole::Producer
    }

    pub fn is_injector(&self) -> bool {
        self.role == WellRole::Injector
    }

    pub fn is_open(&self) -> bool {
        self.status == WellStatus::Open
    }

    pub fn is_gas_injector(&self) -> bool {
        self.is_injector() && self.injection.injector_type == InjectorType::Gas
    }

    /// Whether the rates in force would let a crossflow-banned well flow
    pub fn has_nonzero_rate(&self) -> bool {
        match self.role {
            WellRole::Producer => self.production.total_surface_rate() != 0.0,
            WellRole::Injector => self.injection.surface_rate != 0.0,
        }
    }

    /// A well with crossflow banned and zero rates is kept shut
    pub fn can_open(&self) -> bool {
        self.allow_crossflow || self.has_nonzero_rate()
    }
}
