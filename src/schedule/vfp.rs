//! Versioned lift-curve lookup tables (`VFPPROD`, `VFPINJ`).
//!
//! A table number may be redefined at any step; each definition is in force
//! until the next one with the same number.

use super::builder::ScheduleBuilder;
use super::dynamic_state::DynamicState;
use crate::deck::VfpRecord;
use crate::error::{EntityKind, ScheduleError, ScheduleResult};
use crate::types::ScheduleEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VfpKind {
    Production,
    Injection,
}

impl VfpKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            VfpKind::Production => "VFPPROD",
            VfpKind::Injection => "VFPINJ",
        }
    }
}

/// One lookup table definition.
///
/// `values` is laid out with the flow axis varying fastest, then THP, then
/// the water, gas and lift axes. Injection tables have only flow and THP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VfpTable {
    pub kind: VfpKind,
    pub table_number: u32,
    pub datum_depth: f64,
    pub flow_values: Vec<f64>,
    pub thp_values: Vec<f64>,
    pub wfr_values: Vec<f64>,
    pub gfr_values: Vec<f64>,
    pub alq_values: Vec<f64>,
    pub values: Vec<f64>,
}

impl VfpTable {
    fn from_record(kind: VfpKind, record: &VfpRecord) -> ScheduleResult<Self> {
        let keyword = kind.keyword();
        if record.table < 1 {
            return Err(ScheduleError::invalid(format!(
                "{keyword} table number must be >= 1, got {}",
                record.table
            )));
        }

        let mut axes: Vec<(&str, &[f64])> = vec![
            ("flow", record.flow_values.as_slice()),
            ("THP", record.thp_values.as_slice()),
        ];
        if kind == VfpKind::Production {
            axes.push(("water fraction", record.wfr_values.as_slice()));
            axes.push(("gas fraction", record.gfr_values.as_slice()));
            axes.push(("lift", record.alq_values.as_slice()));
        }
        let mut expected: usize = 1;
        for (name, axis) in &axes {
            check_axis(keyword, name, axis)?;
            expected = expected.saturating_mul(axis.len());
        }
        if record.values.len() != expected {
            return Err(ScheduleError::malformed(
                keyword,
                format!(
                    "table {} has {} values, the axes need {expected}",
                    record.table,
                    record.values.len()
                ),
            ));
        }
        if let Some(v) = record.values.iter().find(|v| !v.is_finite()) {
            return Err(ScheduleError::malformed(keyword, format!("table value {v} is not finite")));
        }

        Ok(Self {
            kind,
            table_number: record.table as u32,
            datum_depth: record.datum_depth.unwrap_or(0.0),
            flow_values: record.flow_values.clone(),
            thp_values: record.thp_values.clone(),
            wfr_values: record.wfr_values.clone(),
            gfr_values: record.gfr_values.clone(),
            alq_values: record.alq_values.clone(),
            values: record.values.clone(),
        })
    }

    /// Axis lengths in storage order, fastest first
    pub fn shape(&self) -> Vec<usize> {
        match self.kind {
            VfpKind::Production => vec![
                self.flow_values.len(),
                self.thp_values.len(),
                self.wfr_values.len(),
                self.gfr_values.len(),
                self.alq_values.len(),
            ],
            VfpKind::Injection => vec![self.flow_values.len(), self.thp_values.len()],
        }
    }

    /// Tabulated value at grid indices given in `shape()` order
    pub fn value(&self, indices: &[usize]) -> Option<f64> {
        let shape = self.shape();
        if indices.len() != shape.len() {
            return None;
        }
        let mut offset = 0;
        let mut stride = 1;
        for (idx, len) in indices.iter().zip(&shape) {
            if idx >= len {
                return None;
            }
            offset += idx * stride;
            stride *= len;
        }
        self.values.get(offset).copied()
    }
}

fn check_axis(keyword: &str, name: &str, axis: &[f64]) -> ScheduleResult<()> {
    if axis.is_empty() {
        return Err(ScheduleError::malformed(keyword, format!("{name} axis is empty")));
    }
    if axis.iter().any(|v| !v.is_finite()) || axis.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ScheduleError::malformed(
            keyword,
            format!("{name} axis must be finite and strictly increasing"),
        ));
    }
    Ok(())
}

/// Table versions per table number. Tables are shared between steps.
#[derive(Debug, Clone, Default)]
pub(crate) struct VfpRegistry {
    tables: BTreeMap<u32, DynamicState<Arc<VfpTable>>>,
}

impl VfpRegistry {
    fn define(&mut self, step: usize, table: VfpTable) -> ScheduleResult<()> {
        let number = table.table_number;
        let table = Arc::new(table);
        match self.tables.get_mut(&number) {
            Some(versions) => {
                versions.set(step, table)?;
            }
            None => {
                self.tables.insert(number, DynamicState::new(step, table));
            }
        }
        Ok(())
    }

    pub fn at(&self, number: u32, step: usize) -> Option<&Arc<VfpTable>> {
        self.tables.get(&number).and_then(|versions| versions.at(step))
    }

    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.tables.keys().copied()
    }
}

pub(crate) fn table_label(kind: VfpKind, number: u32) -> String {
    format!("{} {number}", kind.keyword())
}

impl ScheduleBuilder {
    pub(crate) fn vfp_registry(&self, kind: VfpKind) -> &VfpRegistry {
        match kind {
            VfpKind::Production => &self.vfp_prod,
            VfpKind::Injection => &self.vfp_inj,
        }
    }

    /// Resolve the table item of a control record.
    ///
    /// Defaulted keeps `previous`; 0 means no table; any other number must be
    /// defined at the current step.
    pub(crate) fn vfp_table_number(
        &self,
        kind: VfpKind,
        keyword: &str,
        value: Option<i32>,
        previous: u32,
    ) -> ScheduleResult<u32> {
        match value {
            None => Ok(previous),
            Some(v) if v < 0 => Err(ScheduleError::malformed(
                keyword,
                format!("VFP table number must not be negative, got {v}"),
            )),
            Some(0) => Ok(0),
            Some(v) => {
                let number = v as u32;
                if self.vfp_registry(kind).at(number, self.current_step()).is_none() {
                    return Err(ScheduleError::unknown(EntityKind::LookupTable, table_label(kind, number)));
                }
                Ok(number)
            }
        }
    }

    pub(crate) fn handle_vfp(&mut self, kind: VfpKind, record: &VfpRecord) -> ScheduleResult<()> {
        let step = self.current_step();
        let table = VfpTable::from_record(kind, record)?;
        let number = table.table_number;
        match kind {
            VfpKind::Production => self.vfp_prod.define(step, table)?,
            VfpKind::Injection => self.vfp_inj.define(step, table)?,
        }
        self.events.add(step, ScheduleEvent::VfpTableUpdate);
        info!(table = %table_label(kind, number), step, "Lookup table defined");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injection_record(table: i32) -> VfpRecord {
        VfpRecord {
            table,
            datum_depth: Some(2000.0),
            flow_values: vec![100.0, 200.0, 300.0],
            thp_values: vec![50.0, 100.0],
            values: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            ..Default::default()
        }
    }

    #[test]
    fn injection_table_value_layout() {
        let table = VfpTable::from_record(VfpKind::Injection, &injection_record(1)).expect("valid");
        assert_eq!(table.shape(), vec![3, 2]);
        assert_eq!(table.value(&[0, 0]), Some(1.0));
        assert_eq!(table.value(&[2, 1]), Some(6.0));
        assert_eq!(table.value(&[3, 0]), None);
    }

    #[test]
    fn value_count_must_match_axes() {
        let mut record = injection_record(1);
        record.values.pop();
        assert!(matches!(
            VfpTable::from_record(VfpKind::Injection, &record),
            Err(ScheduleError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn table_number_must_be_positive() {
        assert!(matches!(
            VfpTable::from_record(VfpKind::Injection, &injection_record(0)),
            Err(ScheduleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn axes_must_increase() {
        let mut record = injection_record(2);
        record.thp_values = vec![100.0, 50.0];
        assert!(VfpTable::from_record(VfpKind::Injection, &record).is_err());
    }

    #[test]
    fn registry_versions_by_step() {
        let mut registry = VfpRegistry::default();
        let first = VfpTable::from_record(VfpKind::Injection, &injection_record(3)).expect("valid");
        let mut second = first.clone();
        second.datum_depth = 2500.0;
        registry.define(1, first).expect("in order");
        registry.define(4, second).expect("in order");

        assert!(registry.at(3, 0).is_none());
        assert_eq!(registry.at(3, 2).map(|t| t.datum_depth), Some(2000.0));
        assert_eq!(registry.at(3, 9).map(|t| t.datum_depth), Some(2500.0));
        assert_eq!(registry.numbers().collect::<Vec<_>>(), vec![3]);
    }
}
