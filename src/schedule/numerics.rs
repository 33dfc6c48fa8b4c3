//! Global numerical controls: oil vaporization (`DRSDT`, `DRVDT`,
//! `VAPPARS`) and simulator tuning (`TUNING`).
//!
//! Each record replaces the previous policy wholesale.

use super::builder::{non_negative, parse_item, ScheduleBuilder};
use crate::deck::{DrsdtRecord, DrvdtRecord, TuningRecord, VapparsRecord};
use crate::error::{ScheduleError, ScheduleResult};
use crate::types::ScheduleEvent;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Oil Vaporization
// ============================================================================

/// Dissolution and vaporization rate limits; only one kind is active
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub enum OilVaporizationProperties {
    #[default]
    None,
    /// Maximum rate of increase of dissolved gas-oil ratio
    Drsdt { max_rate: f64, free_gas_only: bool },
    /// Maximum rate of increase of vaporized oil-gas ratio
    Drvdt { max_rate: f64 },
    Vappars { vap1: f64, vap2: f64 },
}

impl OilVaporizationProperties {
    pub fn is_defined(&self) -> bool {
        !matches!(self, OilVaporizationProperties::None)
    }

    pub fn max_drsdt(&self) -> Option<f64> {
        match self {
            OilVaporizationProperties::Drsdt { max_rate, .. } => Some(*max_rate),
            _ => None,
        }
    }

    pub fn max_drvdt(&self) -> Option<f64> {
        match self {
            OilVaporizationProperties::Drvdt { max_rate } => Some(*max_rate),
            _ => None,
        }
    }
}

// ============================================================================
// Tuning
// ============================================================================

/// Time stepping, convergence and iteration controls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TuningParameters {
    // Record 1: time stepping (days)
    pub tsinit: f64,
    pub tsmaxz: f64,
    pub tsminz: f64,
    pub tsmchp: f64,
    pub tsfmax: f64,
    pub tsfmin: f64,
    pub tsfcnv: f64,
    pub tfdiff: f64,
    pub thrupt: f64,
    pub tmaxwc: Option<f64>,

    // Record 2: convergence targets and limits
    pub trgtte: f64,
    pub trgcnv: f64,
    pub trgmbe: f64,
    pub trglcv: f64,
    pub xxxtte: f64,
    pub xxxcnv: f64,
    pub xxxmbe: f64,
    pub xxxlcv: f64,
    pub xxxwfl: f64,
    pub trgfip: f64,

    // Record 3: iteration counts
    pub newtmx: u32,
    pub newtmn: u32,
    pub litmax: u32,
    pub litmin: u32,
    pub mxwsit: u32,
    pub mxwpit: u32,
}

impl Default for TuningParameters {
    fn default() -> Self {
        Self {
            tsinit: 1.0,
            tsmaxz: 365.0,
            tsminz: 0.1,
            tsmchp: 0.15,
            tsfmax: 3.0,
            tsfmin: 0.3,
            tsfcnv: 0.1,
            tfdiff: 1.25,
            thrupt: 1e20,
            tmaxwc: None,
            trgtte: 0.1,
            trgcnv: 0.001,
            trgmbe: 1e-7,
            trglcv: 1e-4,
            xxxtte: 10.0,
            xxxcnv: 0.01,
            xxxmbe: 1e-6,
            xxxlcv: 0.001,
            xxxwfl: 0.001,
            trgfip: 0.025,
            newtmx: 12,
            newtmn: 1,
            litmax: 25,
            litmin: 1,
            mxwsit: 8,
            mxwpit: 8,
        }
    }
}

impl TuningParameters {
    fn from_record(record: &TuningRecord) -> ScheduleResult<Self> {
        const KW: &str = "TUNING";
        let d = Self::default();
        let real = |item: &str, value: Option<f64>, default: f64| -> ScheduleResult<f64> {
            Ok(non_negative(KW, item, value)?.unwrap_or(default))
        };
        let count = |item: &str, value: Option<i32>, default: u32| -> ScheduleResult<u32> {
            match value {
                Some(v) if v < 0 => Err(ScheduleError::malformed(KW, format!("{item} must be >= 0, got {v}"))),
                Some(v) => Ok(v as u32),
                None => Ok(default),
            }
        };

        let tuning = Self {
            tsinit: real("TSINIT", record.tsinit, d.tsinit)?,
            tsmaxz: real("TSMAXZ", record.tsmaxz, d.tsmaxz)?,
            tsminz: real("TSMINZ", record.tsminz, d.tsminz)?,
            tsmchp: real("TSMCHP", record.tsmchp, d.tsmchp)?,
            tsfmax: real("TSFMAX", record.tsfmax, d.tsfmax)?,
            tsfmin: real("TSFMIN", record.tsfmin, d.tsfmin)?,
            tsfcnv: real("TSFCNV", record.tsfcnv, d.tsfcnv)?,
            tfdiff: real("TFDIFF", record.tfdiff, d.tfdiff)?,
            thrupt: real("THRUPT", record.thrupt, d.thrupt)?,
            tmaxwc: non_negative(KW, "TMAXWC", record.tmaxwc)?,
            trgtte: real("TRGTTE", record.trgtte, d.trgtte)?,
            trgcnv: real("TRGCNV", record.trgcnv, d.trgcnv)?,
            trgmbe: real("TRGMBE", record.trgmbe, d.trgmbe)?,
            trglcv: real("TRGLCV", record.trglcv, d.trglcv)?,
            xxxtte: real("XXXTTE", record.xxxtte, d.xxxtte)?,
            xxxcnv: real("XXXCNV", record.xxxcnv, d.xxxcnv)?,
            xxxmbe: real("XXXMBE", record.xxxmbe, d.xxxmbe)?,
            xxxlcv: real("XXXLCV", record.xxxlcv, d.xxxlcv)?,
            xxxwfl: real("XXXWFL", record.xxxwfl, d.xxxwfl)?,
            trgfip: real("TRGFIP", record.trgfip, d.trgfip)?,
            newtmx: count("NEWTMX", record.newtmx, d.newtmx)?,
            newtmn: count("NEWTMN", record.newtmn, d.newtmn)?,
            litmax: count("LITMAX", record.litmax, d.litmax)?,
            litmin: count("LITMIN", record.litmin, d.litmin)?,
            mxwsit: count("MXWSIT", record.mxwsit, d.mxwsit)?,
            mxwpit: count("MXWPIT", record.mxwpit, d.mxwpit)?,
        };
        if tuning.tsminz > tuning.tsmaxz {
            return Err(ScheduleError::malformed(
                KW,
                format!("TSMINZ ({}) exceeds TSMAXZ ({})", tuning.tsminz, tuning.tsmaxz),
            ));
        }
        Ok(tuning)
    }
}

impl ScheduleBuilder {
    fn set_vaporization(&mut self, policy: OilVaporizationProperties) -> ScheduleResult<()> {
        let step = self.current_step();
        if self.vaporization.set(step, policy)? {
            debug!(step, policy = ?policy, "Oil vaporization policy changed");
        }
        Ok(())
    }

    pub(crate) fn handle_drsdt(&mut self, record: &DrsdtRecord) -> ScheduleResult<()> {
        const KW: &str = "DRSDT";
        let max_rate = non_negative(KW, "maximum rate", record.max_rate)?
            .ok_or_else(|| ScheduleError::malformed(KW, "maximum rate is required"))?;
        let free_gas_only = parse_item(KW, "option", record.option.as_deref(), false, |s| {
            match s.to_uppercase().as_str() {
                "ALL" => Some(false),
                "FREE" => Some(true),
                _ => None,
            }
        })?;
        self.set_vaporization(OilVaporizationProperties::Drsdt { max_rate, free_gas_only })
    }

    pub(crate) fn handle_drvdt(&mut self, record: &DrvdtRecord) -> ScheduleResult<()> {
        const KW: &str = "DRVDT";
        let max_rate = non_negative(KW, "maximum rate", record.max_rate)?
            .ok_or_else(|| ScheduleError::malformed(KW, "maximum rate is required"))?;
        self.set_vaporization(OilVaporizationProperties::Drvdt { max_rate })
    }

    pub(crate) fn handle_vappars(&mut self, record: &VapparsRecord) -> ScheduleResult<()> {
        const KW: &str = "VAPPARS";
        let vap1 = non_negative(KW, "oil vaporization propensity", record.oil_vap_propensity)?
            .ok_or_else(|| ScheduleError::malformed(KW, "oil vaporization propensity is required"))?;
        let vap2 = non_negative(KW, "oil density propensity", record.oil_density_propensity)?
            .ok_or_else(|| ScheduleError::malformed(KW, "oil density propensity is required"))?;
        self.set_vaporization(OilVaporizationProperties::Vappars { vap1, vap2 })
    }

    pub(crate) fn handle_tuning(&mut self, record: &TuningRecord) -> ScheduleResult<()> {
        let step = self.current_step();
        let tuning = TuningParameters::from_record(record)?;
        if self.tuning.set(step, tuning)? {
            self.events.add(step, ScheduleEvent::TuningChange);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaulted_tuning_record_gives_defaults() {
        let tuning = TuningParameters::from_record(&TuningRecord::default()).expect("valid");
        assert_eq!(tuning, TuningParameters::default());
        assert_eq!(tuning.newtmx, 12);
        assert_eq!(tuning.tsmaxz, 365.0);
    }

    #[test]
    fn tuning_overrides_and_validation() {
        let record = TuningRecord {
            tsinit: Some(0.5),
            litmax: Some(40),
            ..Default::default()
        };
        let tuning = TuningParameters::from_record(&record).expect("valid");
        assert_eq!(tuning.tsinit, 0.5);
        assert_eq!(tuning.litmax, 40);

        let bad = TuningRecord {
            tsminz: Some(500.0),
            ..Default::default()
        };
        assert!(TuningParameters::from_record(&bad).is_err());
    }

    #[test]
    fn vaporization_accessors() {
        let drsdt = OilVaporizationProperties::Drsdt { max_rate: 0.0, free_gas_only: true };
        assert!(drsdt.is_defined());
        assert_eq!(drsdt.max_drsdt(), Some(0.0));
        assert_eq!(drsdt.max_drvdt(), None);
        assert!(!OilVaporizationProperties::default().is_defined());
    }
}
