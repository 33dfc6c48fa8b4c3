//! Read-only schedule view and query API.
//!
//! A `Schedule` is produced once by `ScheduleBuilder::finish` and never
//! mutated afterwards, so it can be shared freely between threads.

use super::builder::ScheduleBuilder;
use super::dynamic_state::DynamicState;
use super::events::EventLog;
use super::groups::{effective_injection, effective_production, group_snapshot, GroupTimeline};
use super::name_pattern::{NamePattern, WellLists};
use super::numerics::{OilVaporizationProperties, TuningParameters};
use super::output::{restart_due, rft_due, RestartPolicy};
use super::time_map::TimeMap;
use super::vfp::{table_label, VfpKind, VfpRegistry, VfpTable};
use super::well_test::WellTestConfig;
use super::wells::WellTimeline;
use super::{GroupId, WellId};
use crate::config::ScheduleConfig;
use crate::deck::Deck;
use crate::error::{EntityKind, ScheduleError, ScheduleResult};
use crate::types::{Group, GroupInjectionControl, GroupProductionControl, ScheduleEvent, Well, WellStatus};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Per-step summary produced by [`Schedule::step_reports`]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StepReport {
    pub step: usize,
    pub time: NaiveDateTime,
    pub num_wells: usize,
    pub num_groups: usize,
    pub open_wells: Vec<String>,
    pub rft_wells: Vec<String>,
    pub write_restart: bool,
    pub events: Vec<ScheduleEvent>,
}

pub struct Schedule {
    config: ScheduleConfig,
    time_map: TimeMap,
    wells: Vec<WellTimeline>,
    well_index: HashMap<String, WellId>,
    groups: Vec<GroupTimeline>,
    group_index: HashMap<String, GroupId>,
    well_lists: DynamicState<WellLists>,
    restart: DynamicState<RestartPolicy>,
    rft_open_armed: Option<usize>,
    well_tests: DynamicState<WellTestConfig>,
    vfp_prod: VfpRegistry,
    vfp_inj: VfpRegistry,
    vaporization: DynamicState<OilVaporizationProperties>,
    tuning: DynamicState<TuningParameters>,
    events: EventLog,
}

impl Schedule {
    /// Fold a whole deck into a schedule
    pub fn from_deck(deck: &Deck, config: &ScheduleConfig) -> ScheduleResult<Self> {
        let mut builder = ScheduleBuilder::new(deck.start, config);
        builder.apply_deck(deck)?;
        Ok(builder.finish())
    }

    pub(crate) fn from_builder(builder: ScheduleBuilder) -> Self {
        debug!(
            steps = builder.time_map.num_steps(),
            wells = builder.wells.len(),
            groups = builder.groups.len(),
            "Schedule finalised"
        );
        Self {
            config: builder.config,
            time_map: builder.time_map,
            wells: builder.wells,
            well_index: builder.well_index,
            groups: builder.groups,
            group_index: builder.group_index,
            well_lists: builder.well_lists,
            restart: builder.restart,
            rft_open_armed: builder.rft_open_armed,
            well_tests: builder.well_tests,
            vfp_prod: builder.vfp_prod,
            vfp_inj: builder.vfp_inj,
            vaporization: builder.vaporization,
            tuning: builder.tuning,
            events: builder.events,
        }
    }

    // ========================================================================
    // Timeline
    // ========================================================================

    pub fn num_steps(&self) -> usize {
        self.time_map.num_steps()
    }

    pub fn time_map(&self) -> &TimeMap {
        &self.time_map
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    fn check_step(&self, step: usize) -> ScheduleResult<()> {
        if step < self.num_steps() {
            Ok(())
        } else {
            Err(ScheduleError::OutOfRange {
                step,
                num_steps: self.num_steps(),
            })
        }
    }

    // ========================================================================
    // Wells
    // ========================================================================

    /// Well names in creation order.
    ///
    /// `pattern` may be an exact name, a `*`/`?` glob or a well list name;
    /// `None` or empty matches every well. `step = None` means every well
    /// ever defined.
    pub fn well_names(&self, pattern: Option<&str>, step: Option<usize>) -> ScheduleResult<Vec<String>> {
        if let Some(s) = step {
            self.check_step(s)?;
        }
        let exists = |w: &WellTimeline| step.map_or(true, |s| w.exists_at(s));
        let pattern = pattern.map(str::trim).filter(|p| !p.is_empty());

        let Some(pattern) = pattern else {
            return Ok(self.wells.iter().filter(|w| exists(w)).map(|w| w.name.clone()).collect());
        };

        let lists = match step {
            Some(s) => self.well_lists.at(s),
            None => Some(self.well_lists.current()),
        };
        if let Some(members) = lists.and_then(|l| l.get(pattern)) {
            return Ok(self
                .wells
                .iter()
                .filter(|w| exists(w) && members.contains(&w.name))
                .map(|w| w.name.clone())
                .collect());
        }

        let matcher = NamePattern::parse(pattern)?;
        Ok(self
            .wells
            .iter()
            .filter(|w| exists(w) && matcher.matches(&w.name))
            .map(|w| w.name.clone())
            .collect())
    }

    /// Whether the well is ever defined
    pub fn has_well(&self, name: &str) -> bool {
        self.well_index.contains_key(name)
    }

    /// Whether the well exists at `step`; false beyond the timeline
    pub fn has_well_at(&self, name: &str, step: usize) -> bool {
        step < self.num_steps()
            && self
                .well_index
                .get(name)
                .is_some_and(|id| self.wells[id.0].exists_at(step))
    }

    pub fn get_well(&self, name: &str, step: usize) -> ScheduleResult<Well> {
        let id = self
            .well_index
            .get(name)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Well, name))?;
        self.check_step(step)?;
        self.wells[id.0]
            .snapshot(step, &self.groups)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Well, name))
    }

    /// Number of wells that exist at `step`
    pub fn num_wells(&self, step: usize) -> ScheduleResult<usize> {
        self.check_step(step)?;
        Ok(self.wells.iter().filter(|w| w.exists_at(step)).count())
    }

    /// Members of a well list at `step`
    pub fn well_list(&self, name: &str, step: usize) -> ScheduleResult<Vec<String>> {
        self.check_step(step)?;
        self.well_lists
            .at(step)
            .and_then(|lists| lists.get(name))
            .map(<[String]>::to_vec)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::WellList, name))
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Whether the group exists at `step`; false beyond the timeline
    pub fn has_group(&self, name: &str, step: usize) -> bool {
        step < self.num_steps()
            && self
                .group_index
                .get(name)
                .is_some_and(|id| self.groups[id.0].exists_at(step))
    }

    pub fn get_group(&self, name: &str, step: usize) -> ScheduleResult<Group> {
        let id = self
            .group_index
            .get(name)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Group, name))?;
        self.check_step(step)?;
        group_snapshot(&self.groups, &self.wells, *id, step)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Group, name))
    }

    /// Group names at `step`, in creation order
    pub fn group_names(&self, step: usize) -> ScheduleResult<Vec<String>> {
        self.check_step(step)?;
        Ok(self
            .groups
            .iter()
            .filter(|g| g.exists_at(step))
            .map(|g| g.name.clone())
            .collect())
    }

    pub fn root_group(&self) -> &str {
        &self.config.groups.root
    }

    /// Production control in force for a group with `FLD` resolved upward
    pub fn effective_production_control(&self, name: &str, step: usize) -> ScheduleResult<GroupProductionControl> {
        let id = self.group_at(name, step)?;
        effective_production(&self.groups, id, step)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Group, name))
    }

    pub fn effective_injection_control(&self, name: &str, step: usize) -> ScheduleResult<GroupInjectionControl> {
        let id = self.group_at(name, step)?;
        effective_injection(&self.groups, id, step)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Group, name))
    }

    fn group_at(&self, name: &str, step: usize) -> ScheduleResult<GroupId> {
        let id = *self
            .group_index
            .get(name)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Group, name))?;
        self.check_step(step)?;
        if !self.groups[id.0].exists_at(step) {
            return Err(ScheduleError::unknown(EntityKind::Group, name));
        }
        Ok(id)
    }

    // ========================================================================
    // Deltas and events
    // ========================================================================

    /// Wells and groups whose snapshot at `step` differs from `step - 1`.
    /// Entities created at `step` are always included.
    pub fn changed_entities(&self, step: usize) -> ScheduleResult<BTreeSet<String>> {
        self.check_step(step)?;
        let mut changed = BTreeSet::new();
        for well in &self.wells {
            let now = well.snapshot(step, &self.groups);
            let before = step.checked_sub(1).and_then(|p| well.snapshot(p, &self.groups));
            if now.is_some() && now != before {
                changed.insert(well.name.clone());
            }
        }
        for (idx, group) in self.groups.iter().enumerate() {
            let id = GroupId(idx);
            let now = group_snapshot(&self.groups, &self.wells, id, step);
            let before = step
                .checked_sub(1)
                .and_then(|p| group_snapshot(&self.groups, &self.wells, id, p));
            if now.is_none() {
                continue;
            }
            // FLD targets follow their ancestors without touching the group itself
            let inherited_changed = step.checked_sub(1).is_some_and(|p| {
                effective_production(&self.groups, id, step) != effective_production(&self.groups, id, p)
                    || effective_injection(&self.groups, id, step) != effective_injection(&self.groups, id, p)
            });
            if now != before || inherited_changed {
                changed.insert(group.name.clone());
            }
        }
        Ok(changed)
    }

    pub fn has_event(&self, event: ScheduleEvent, step: usize) -> bool {
        self.events.has_event(event, step)
    }

    pub fn events_at(&self, step: usize) -> BTreeSet<ScheduleEvent> {
        self.events.events_at(step)
    }

    pub fn entity_events(&self, name: &str, step: usize) -> BTreeSet<ScheduleEvent> {
        self.events.entity_events(name, step)
    }

    pub fn has_entity_event(&self, name: &str, event: ScheduleEvent, step: usize) -> bool {
        self.events.has_entity_event(name, event, step)
    }

    // ========================================================================
    // Auxiliary schedules
    // ========================================================================

    /// Lookup table definition in force at `step`
    pub fn lookup_table(&self, kind: VfpKind, number: u32, step: usize) -> ScheduleResult<Arc<VfpTable>> {
        self.check_step(step)?;
        let registry = match kind {
            VfpKind::Production => &self.vfp_prod,
            VfpKind::Injection => &self.vfp_inj,
        };
        registry
            .at(number, step)
            .cloned()
            .ok_or_else(|| ScheduleError::unknown(EntityKind::LookupTable, table_label(kind, number)))
    }

    /// Whether RFT output is due for a well at `step`
    pub fn output_schedule(&self, well: &str, step: usize) -> ScheduleResult<bool> {
        let id = self
            .well_index
            .get(well)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Well, well))?;
        self.check_step(step)?;
        Ok(rft_due(&self.wells[id.0], step, self.rft_open_armed))
    }

    /// First step at which any well has RFT output due
    pub fn first_rft_output(&self) -> Option<usize> {
        (0..self.num_steps()).find(|step| self.wells.iter().any(|w| rft_due(w, *step, self.rft_open_armed)))
    }

    pub fn retest_policy(&self, step: usize) -> ScheduleResult<&WellTestConfig> {
        self.check_step(step)?;
        self.well_tests
            .at(step)
            .ok_or(ScheduleError::OutOfRange { step, num_steps: self.num_steps() })
    }

    pub fn write_restart(&self, step: usize) -> ScheduleResult<bool> {
        self.check_step(step)?;
        restart_due(&self.restart, step, &self.time_map)
    }

    pub fn restart_policy(&self, step: usize) -> ScheduleResult<RestartPolicy> {
        self.check_step(step)?;
        Ok(self.restart.at(step).copied().unwrap_or_default())
    }

    pub fn oil_vaporization(&self, step: usize) -> ScheduleResult<OilVaporizationProperties> {
        self.check_step(step)?;
        Ok(self.vaporization.at(step).copied().unwrap_or_default())
    }

    pub fn tuning(&self, step: usize) -> ScheduleResult<TuningParameters> {
        self.check_step(step)?;
        Ok(self.tuning.at(step).cloned().unwrap_or_default())
    }

    // ========================================================================
    // Reports
    // ========================================================================

    fn step_report(&self, step: usize) -> ScheduleResult<StepReport> {
        let existing: Vec<&WellTimeline> = self.wells.iter().filter(|w| w.exists_at(step)).collect();
        let open_wells = existing
            .iter()
            .filter(|w| w.status.at(step).is_some_and(|s| *s == WellStatus::Open))
            .map(|w| w.name.clone())
            .collect();
        let rft_wells = existing
            .iter()
            .filter(|w| rft_due(w, step, self.rft_open_armed))
            .map(|w| w.name.clone())
            .collect();

        Ok(StepReport {
            step,
            time: self.time_map.time(step)?,
            num_wells: existing.len(),
            num_groups: self.groups.iter().filter(|g| g.exists_at(step)).count(),
            open_wells,
            rft_wells,
            write_restart: self.write_restart(step)?,
            events: self.events.events_at(step).into_iter().collect(),
        })
    }

    /// Summary of every step, computed in parallel
    pub fn step_reports(&self) -> ScheduleResult<Vec<StepReport>> {
        (0..self.num_steps())
            .into_par_iter()
            .map(|step| self.step_report(step))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn schedule_is_shareable() {
        assert_send_sync::<Schedule>();
        assert_send_sync::<Well>();
    }
}
