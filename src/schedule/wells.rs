//! Well timelines and the well identity, status, efficiency, well list,
//! guide rate and auxiliary-property keywords.

use super::builder::{non_negative, parse_item, parse_yes_no, ScheduleBuilder};
use super::dynamic_state::DynamicState;
use super::groups::GroupTimeline;
use super::output::RftMode;
use super::{GroupId, WellId};
use crate::deck::{
    WefacRecord, WelspecsRecord, WfoamRecord, WgrupconRecord, WlistRecord, WpolymerRecord,
    WsolventRecord, WtempRecord, WtracerRecord,
};
use crate::error::{EntityKind, ScheduleError, ScheduleResult};
use crate::schedule::name_pattern::WlistAction;
use crate::types::{
    GuideRate, GuideRatePhase, Phase, ScheduleEvent, Well, WellAuxProperties, WellConnections,
    WellInjectionProperties, WellProductionProperties, WellRole, WellStatus,
};
use tracing::{debug, info, warn};

// ============================================================================
// Well Timeline
// ============================================================================

/// Head location: 0-based grid column and row plus reference depth
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WellHead {
    pub i: usize,
    pub j: usize,
    pub ref_depth: Option<f64>,
}

/// Every attribute of one well as its own override timeline.
///
/// All timelines start at the creation step, so a snapshot exists for every
/// step at or after it.
#[derive(Debug, Clone)]
pub(crate) struct WellTimeline {
    pub name: String,
    pub creation_step: usize,
    pub preferred_phase: Phase,
    pub allow_crossflow: bool,
    pub head: DynamicState<WellHead>,
    pub group: DynamicState<GroupId>,
    pub status: DynamicState<WellStatus>,
    pub role: DynamicState<WellRole>,
    pub production: DynamicState<WellProductionProperties>,
    pub injection: DynamicState<WellInjectionProperties>,
    pub efficiency: DynamicState<f64>,
    pub connections: DynamicState<WellConnections>,
    pub guide_rate: DynamicState<GuideRate>,
    pub group_controlled: DynamicState<bool>,
    pub aux: DynamicState<WellAuxProperties>,
    pub rft: DynamicState<RftMode>,
    /// First step from which the first-open RFT trigger is armed
    pub rft_first_open_from: Option<usize>,
}

impl WellTimeline {
    fn new(
        name: &str,
        step: usize,
        head: WellHead,
        group: GroupId,
        preferred_phase: Phase,
        allow_crossflow: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            creation_step: step,
            preferred_phase,
            allow_crossflow,
            head: DynamicState::new(step, head),
            group: DynamicState::new(step, group),
            status: DynamicState::new(step, WellStatus::Shut),
            role: DynamicState::new(step, WellRole::Producer),
            production: DynamicState::new(step, WellProductionProperties::default()),
            injection: DynamicState::new(step, WellInjectionProperties::default()),
            efficiency: DynamicState::new(step, 1.0),
            connections: DynamicState::new(step, WellConnections::new()),
            guide_rate: DynamicState::new(step, GuideRate::default()),
            group_controlled: DynamicState::new(step, true),
            aux: DynamicState::new(step, WellAuxProperties::default()),
            rft: DynamicState::new(step, RftMode::Never),
            rft_first_open_from: None,
        }
    }

    pub fn exists_at(&self, step: usize) -> bool {
        step >= self.creation_step
    }

    /// Assemble the well as seen at `step`; `None` before creation
    pub fn snapshot(&self, step: usize, groups: &[GroupTimeline]) -> Option<Well> {
        if !self.exists_at(step) {
            return None;
        }
        let head = self.head.at(step)?;
        let group = self.group.at(step)?;
        Some(Well {
            name: self.name.clone(),
            creation_step: self.creation_step,
            head_i: head.i,
            head_j: head.j,
            ref_depth: head.ref_depth,
            group: groups.get(group.0).map(|g| g.name.clone()).unwrap_or_default(),
            preferred_phase: self.preferred_phase,
            allow_crossflow: self.allow_crossflow,
            status: *self.status.at(step)?,
            role: *self.role.at(step)?,
            production: self.production.at(step)?.clone(),
            injection: self.injection.at(step)?.clone(),
            efficiency_factor: *self.efficiency.at(step)?,
            connections: self.connections.at(step)?.clone(),
            guide_rate: self.guide_rate.at(step)?.clone(),
            available_for_group_control: *self.group_controlled.at(step)?,
            aux: self.aux.at(step)?.clone(),
        })
    }
}

/// Convert a 1-based deck head coordinate, checking it against the grid
fn head_index(keyword: &str, item: &str, value: Option<i32>, dim: usize) -> ScheduleResult<usize> {
    let v = value.ok_or_else(|| ScheduleError::malformed(keyword, format!("{item} is required")))?;
    if v < 1 {
        return Err(ScheduleError::malformed(keyword, format!("{item} must be >= 1, got {v}")));
    }
    let idx = (v - 1) as usize;
    if idx >= dim {
        return Err(ScheduleError::invalid(format!(
            "{keyword} {item} {v} is outside the grid (size {dim})"
        )));
    }
    Ok(idx)
}

impl ScheduleBuilder {
    /// The well as it stands at the current step
    pub(crate) fn current_well(&self, id: WellId) -> ScheduleResult<Well> {
        let well = &self.wells[id.0];
        well.snapshot(self.current_step(), &self.groups)
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Well, well.name.clone()))
    }

    /// Set a well's status at the current step.
    ///
    /// An OPEN request for a well with connections, none of them open, is
    /// vetoed; the well stays as it is. Returns whether the status changed.
    pub(crate) fn set_well_status(&mut self, id: WellId, status: WellStatus) -> ScheduleResult<bool> {
        let step = self.current_step();
        let well = &mut self.wells[id.0];
        if status == WellStatus::Open && well.connections.current().all_shut() {
            info!(well = %well.name, step, "All connections are shut; open request ignored");
            return Ok(false);
        }
        let changed = well.status.set(step, status)?;
        if changed {
            debug!(well = %well.name, step, status = %status, "Well status changed");
            self.events.add_for(&well.name, step, ScheduleEvent::WellStatusChange);
        }
        Ok(changed)
    }

    // ========================================================================
    // WELSPECS
    // ========================================================================

    pub(crate) fn handle_welspecs(&mut self, record: &WelspecsRecord) -> ScheduleResult<()> {
        const KW: &str = "WELSPECS";
        let step = self.current_step();
        let name = record.well.trim();
        let group_name = record.group.trim();
        self.check_entity_name(KW, EntityKind::Well, name)?;
        self.check_entity_name(KW, EntityKind::Group, group_name)?;

        let grid = &self.config.grid;
        let head = WellHead {
            i: head_index(KW, "head I", record.head_i, grid.nx)?,
            j: head_index(KW, "head J", record.head_j, grid.ny)?,
            ref_depth: record.ref_depth,
        };
        let phase = parse_item(KW, "preferred phase", record.phase.as_deref(), Phase::Oil, Phase::from_keyword)?;
        let allow_crossflow =
            parse_item(KW, "crossflow flag", record.crossflow.as_deref(), true, parse_yes_no)?;

        let group_id = self.ensure_group(group_name);

        let Some(id) = self.well_index.get(name).copied() else {
            let id = WellId(self.wells.len());
            self.wells
                .push(WellTimeline::new(name, step, head, group_id, phase, allow_crossflow));
            self.well_index.insert(name.to_string(), id);
            self.events.add_for(name, step, ScheduleEvent::NewWell);
            self.events.add_for(group_name, step, ScheduleEvent::GroupChange);
            info!(well = name, group = group_name, step, "Well defined");
            return Ok(());
        };

        let well = &mut self.wells[id.0];
        if well.head.set(step, head)? {
            self.events.add_for(name, step, ScheduleEvent::WellWelspecsUpdate);
        }
        let previous_group = *well.group.current();
        if well.group.set(step, group_id)? {
            self.events.add_for(name, step, ScheduleEvent::GroupChange);
            self.events.add_for(group_name, step, ScheduleEvent::GroupChange);
            if let Some(old) = self.groups.get(previous_group.0) {
                self.events.add_for(&old.name, step, ScheduleEvent::GroupChange);
            }
            info!(well = name, group = group_name, step, "Well moved to another group");
        }
        if well.preferred_phase != phase || well.allow_crossflow != allow_crossflow {
            debug!(well = name, step, "Preferred phase and crossflow are fixed at creation; new values ignored");
        }
        Ok(())
    }

    // ========================================================================
    // WEFAC
    // ========================================================================

    pub(crate) fn handle_wefac(&mut self, record: &WefacRecord) -> ScheduleResult<()> {
        let step = self.current_step();
        let ids = self.resolve_wells(&record.well)?;
        let factor = non_negative("WEFAC", "efficiency factor", record.efficiency_factor)?.unwrap_or(1.0);
        for id in ids {
            let well = &mut self.wells[id.0];
            if well.efficiency.set(step, factor)? {
                self.events.add_for(&well.name, step, ScheduleEvent::EfficiencyUpdate);
            }
        }
        Ok(())
    }

    // ========================================================================
    // WLIST
    // ========================================================================

    pub(crate) fn handle_wlist(&mut self, record: &WlistRecord) -> ScheduleResult<()> {
        let step = self.current_step();
        let action = WlistAction::from_keyword(&record.action).ok_or_else(|| {
            ScheduleError::invalid(format!("unknown WLIST action '{}'", record.action.trim()))
        })?;

        let mut names: Vec<String> = Vec::new();
        for pattern in &record.wells {
            for id in self.resolve_wells(pattern)? {
                names.push(self.wells[id.0].name.clone());
            }
        }

        let mut lists = self.well_lists.current().clone();
        lists.apply(record.name.trim(), action, &names)?;
        self.well_lists.set(step, lists)?;
        debug!(list = record.name.trim(), step, wells = names.len(), "Well list updated");
        Ok(())
    }

    // ========================================================================
    // WGRUPCON
    // ========================================================================

    pub(crate) fn handle_wgrupcon(&mut self, record: &WgrupconRecord) -> ScheduleResult<()> {
        const KW: &str = "WGRUPCON";
        let step = self.current_step();
        let ids = self.resolve_wells(&record.well)?;
        let controlled =
            parse_item(KW, "group control flag", record.group_controlled.as_deref(), true, parse_yes_no)?;
        let value = non_negative(KW, "guide rate", record.guide_rate)?;
        let phase = parse_item(
            KW,
            "guide rate phase",
            record.phase.as_deref(),
            GuideRatePhase::Undefined,
            GuideRatePhase::from_keyword,
        )?;
        let scaling_factor = non_negative(KW, "scaling factor", record.scaling_factor)?.unwrap_or(1.0);
        let guide_rate = GuideRate {
            phase,
            value,
            scaling_factor,
            auto_recalculate: value.is_none(),
        };

        for id in ids {
            let well = &mut self.wells[id.0];
            well.group_controlled.set(step, controlled)?;
            well.guide_rate.set(step, guide_rate.clone())?;
        }
        Ok(())
    }

    // ========================================================================
    // Auxiliary properties
    // ========================================================================

    pub(crate) fn handle_wpolymer(&mut self, record: &WpolymerRecord) -> ScheduleResult<()> {
        const KW: &str = "WPOLYMER";
        if record.group_polymer_concentration.is_some() || record.group_salt_concentration.is_some() {
            return Err(ScheduleError::invalid(
                "WPOLYMER group polymer and salt concentrations are not supported",
            ));
        }
        let ids = self.resolve_wells(&record.well)?;
        let polymer = non_negative(KW, "polymer concentration", record.polymer_concentration)?.unwrap_or(0.0);
        let salt = non_negative(KW, "salt concentration", record.salt_concentration)?.unwrap_or(0.0);
        self.update_aux(&ids, |aux| {
            aux.polymer.polymer_concentration = polymer;
            aux.polymer.salt_concentration = salt;
        })
    }

    pub(crate) fn handle_wsolvent(&mut self, record: &WsolventRecord) -> ScheduleResult<()> {
        const KW: &str = "WSOLVENT";
        let ids = self.resolve_wells(&record.well)?;
        let fraction = non_negative(KW, "solvent fraction", record.solvent_fraction)?
            .ok_or_else(|| ScheduleError::malformed(KW, "solvent fraction is required"))?;
        for id in &ids {
            let well = self.current_well(*id)?;
            if !well.is_gas_injector() {
                return Err(ScheduleError::invalid(format!(
                    "WSOLVENT applies to gas injectors only; {} is not one",
                    well.name
                )));
            }
        }
        self.update_aux(&ids, |aux| aux.solvent_fraction = fraction)
    }

    pub(crate) fn handle_wtracer(&mut self, record: &WtracerRecord) -> ScheduleResult<()> {
        const KW: &str = "WTRACER";
        let tracer = record.tracer.trim().to_string();
        if tracer.is_empty() {
            return Err(ScheduleError::malformed(KW, "tracer name is required"));
        }
        let ids = self.resolve_wells(&record.well)?;
        let concentration = non_negative(KW, "tracer concentration", record.concentration)?.unwrap_or(0.0);
        self.update_aux(&ids, |aux| {
            aux.tracer_concentrations.insert(tracer.clone(), concentration);
        })
    }

    pub(crate) fn handle_wfoam(&mut self, record: &WfoamRecord) -> ScheduleResult<()> {
        let ids = self.resolve_wells(&record.well)?;
        let concentration =
            non_negative("WFOAM", "foam concentration", record.foam_concentration)?.unwrap_or(0.0);
        self.update_aux(&ids, |aux| aux.foam_concentration = concentration)
    }

    pub(crate) fn handle_wtemp(&mut self, record: &WtempRecord) -> ScheduleResult<()> {
        const KW: &str = "WTEMP";
        let step = self.current_step();
        let temperature = record
            .temperature
            .filter(|t| t.is_finite())
            .ok_or_else(|| ScheduleError::malformed(KW, "temperature is required"))?;

        let mut injectors = Vec::new();
        for id in self.resolve_wells(&record.well)? {
            if *self.wells[id.0].role.current() == WellRole::Injector {
                injectors.push(id);
            } else {
                warn!(well = %self.wells[id.0].name, step, "WTEMP applies to injectors only; ignored for producer");
            }
        }
        self.update_aux(&injectors, |aux| aux.injection_temperature = Some(temperature))
    }

    fn update_aux<F>(&mut self, ids: &[WellId], f: F) -> ScheduleResult<()>
    where
        F: Fn(&mut WellAuxProperties),
    {
        let step = self.current_step();
        for id in ids {
            self.wells[id.0].aux.update(step, &f)?;
        }
        Ok(())
    }
}
