//! Group hierarchy and group control keywords.
//!
//! Groups hold a parent reference per step; child groups and member wells
//! are derived from those references when a snapshot is taken.

use super::builder::{non_negative, parse_item, parse_required, parse_yes_no, ScheduleBuilder};
use super::dynamic_state::DynamicState;
use super::wells::WellTimeline;
use super::GroupId;
use crate::deck::{GconinjeRecord, GconprodRecord, GefacRecord, GruptreeRecord};
use crate::error::{EntityKind, ScheduleError, ScheduleResult};
use crate::types::{
    ExceedAction, Group, GroupInjectionCMode, GroupInjectionControl, GroupProductionCMode,
    GroupProductionControl, GuideRate, GuideRatePhase, Phase, ScheduleEvent,
};
use tracing::{debug, info};

// ============================================================================
// Group Timeline
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GroupEfficiency {
    pub factor: f64,
    pub transfer_to_network: bool,
}

impl Default for GroupEfficiency {
    fn default() -> Self {
        Self {
            factor: 1.0,
            transfer_to_network: true,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GroupTimeline {
    pub name: String,
    pub creation_step: usize,
    pub parent: DynamicState<Option<GroupId>>,
    pub production: DynamicState<GroupProductionControl>,
    pub injection: DynamicState<GroupInjectionControl>,
    pub guide_rate: DynamicState<GuideRate>,
    pub efficiency: DynamicState<GroupEfficiency>,
}

impl GroupTimeline {
    fn new(name: &str, step: usize, parent: Option<GroupId>) -> Self {
        Self {
            name: name.to_string(),
            creation_step: step,
            parent: DynamicState::new(step, parent),
            production: DynamicState::new(step, GroupProductionControl::default()),
            injection: DynamicState::new(step, GroupInjectionControl::default()),
            guide_rate: DynamicState::new(step, GuideRate::default()),
            efficiency: DynamicState::new(step, GroupEfficiency::default()),
        }
    }

    pub fn exists_at(&self, step: usize) -> bool {
        step >= self.creation_step
    }
}

/// Assemble a group as seen at `step`; `None` before creation
pub(crate) fn group_snapshot(
    groups: &[GroupTimeline],
    wells: &[WellTimeline],
    id: GroupId,
    step: usize,
) -> Option<Group> {
    let group = groups.get(id.0)?;
    if !group.exists_at(step) {
        return None;
    }
    let parent = (*group.parent.at(step)?).and_then(|p| groups.get(p.0)).map(|p| p.name.clone());
    let child_groups = groups
        .iter()
        .filter(|g| g.exists_at(step) && g.parent.at(step).copied().flatten() == Some(id))
        .map(|g| g.name.clone())
        .collect();
    let member_wells = wells
        .iter()
        .filter(|w| w.exists_at(step) && w.group.at(step).copied() == Some(id))
        .map(|w| w.name.clone())
        .collect();
    let efficiency = group.efficiency.at(step)?;

    Some(Group {
        name: group.name.clone(),
        creation_step: group.creation_step,
        parent,
        child_groups,
        wells: member_wells,
        production: group.production.at(step)?.clone(),
        injection: group.injection.at(step)?.clone(),
        guide_rate: group.guide_rate.at(step)?.clone(),
        efficiency_factor: efficiency.factor,
        transfer_efficiency_to_network: efficiency.transfer_to_network,
    })
}

/// Production control in force for a group, following `FLD` up the tree.
///
/// A root still on `FLD` yields the default (no control).
pub(crate) fn effective_production(
    groups: &[GroupTimeline],
    id: GroupId,
    step: usize,
) -> Option<GroupProductionControl> {
    let mut current = id;
    for _ in 0..=groups.len() {
        let group = groups.get(current.0)?;
        let control = group.production.at(step)?;
        if control.cmode != GroupProductionCMode::Fld {
            return Some(control.clone());
        }
        match *group.parent.at(step)? {
            Some(parent) => current = parent,
            None => return Some(GroupProductionControl::default()),
        }
    }
    None
}

/// Injection control in force for a group, following `FLD` up the tree
pub(crate) fn effective_injection(
    groups: &[GroupTimeline],
    id: GroupId,
    step: usize,
) -> Option<GroupInjectionControl> {
    let mut current = id;
    for _ in 0..=groups.len() {
        let group = groups.get(current.0)?;
        let control = group.injection.at(step)?;
        if control.cmode != GroupInjectionCMode::Fld {
            return Some(control.clone());
        }
        match *group.parent.at(step)? {
            Some(parent) => current = parent,
            None => return Some(GroupInjectionControl::default()),
        }
    }
    None
}

/// Guide rate from the `GUIDE_RATE`/`GUIDE_RATE_DEF` items; `None` when both are defaulted
fn group_guide_rate(keyword: &str, value: Option<f64>, definition: Option<&str>) -> ScheduleResult<Option<GuideRate>> {
    let value = non_negative(keyword, "guide rate", value)?;
    let definition = definition.map(str::trim).filter(|d| !d.is_empty());
    if value.is_none() && definition.is_none() {
        return Ok(None);
    }
    let mut guide_rate = GuideRate {
        value,
        ..GuideRate::default()
    };
    match definition {
        Some(d) if d.eq_ignore_ascii_case("FORM") => guide_rate.auto_recalculate = true,
        Some(d) => {
            guide_rate.phase = GuideRatePhase::from_keyword(d).ok_or_else(|| {
                ScheduleError::malformed(keyword, format!("invalid guide rate definition '{d}'"))
            })?;
        }
        None => {}
    }
    Ok(Some(guide_rate))
}

impl ScheduleBuilder {
    pub(crate) fn root_group(&self) -> GroupId {
        GroupId(0)
    }

    pub(crate) fn create_group(&mut self, name: &str, parent: Option<GroupId>) -> GroupId {
        let step = self.current_step();
        let id = GroupId(self.groups.len());
        self.groups.push(GroupTimeline::new(name, step, parent));
        self.group_index.insert(name.to_string(), id);
        self.events.add_for(name, step, ScheduleEvent::NewGroup);
        info!(group = name, step, "Group defined");
        id
    }

    /// Look a group up, creating it under the root when it is new.
    /// Callers check the name.
    pub(crate) fn ensure_group(&mut self, name: &str) -> GroupId {
        if let Some(id) = self.group_index.get(name).copied() {
            return id;
        }
        let root = self.root_group();
        self.create_group(name, Some(root))
    }

    /// Whether `ancestor` is `id` or lies on its current path to the root
    fn is_ancestor(&self, ancestor: GroupId, id: GroupId) -> bool {
        let mut current = Some(id);
        let mut hops = 0;
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.groups.len() {
                return false;
            }
            current = *self.groups[c.0].parent.current();
        }
        false
    }

    // ========================================================================
    // GRUPTREE
    // ========================================================================

    pub(crate) fn handle_gruptree(&mut self, record: &GruptreeRecord) -> ScheduleResult<()> {
        const KW: &str = "GRUPTREE";
        let step = self.current_step();
        let child = record.child.trim();
        let parent = record.parent.trim();
        self.check_entity_name(KW, EntityKind::Group, child)?;
        self.check_entity_name(KW, EntityKind::Group, parent)?;

        if child == self.config.groups.root {
            return Err(ScheduleError::invalid(format!(
                "the root group {child} cannot be given a parent"
            )));
        }
        if child == parent {
            return Err(ScheduleError::invalid(format!("group {child} cannot be its own parent")));
        }
        if let (Some(c), Some(p)) = (self.group_index.get(child), self.group_index.get(parent)) {
            if self.is_ancestor(*c, *p) {
                return Err(ScheduleError::invalid(format!(
                    "placing {child} under {parent} would create a cycle"
                )));
            }
        }

        let parent_id = self.ensure_group(parent);
        match self.group_index.get(child).copied() {
            None => {
                self.create_group(child, Some(parent_id));
            }
            Some(child_id) => {
                if self.groups[child_id.0].parent.set(step, Some(parent_id))? {
                    self.events.add_for(child, step, ScheduleEvent::GroupChange);
                    self.events.add_for(parent, step, ScheduleEvent::GroupChange);
                    debug!(group = child, parent, step, "Group moved");
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // GCONPROD
    // ========================================================================

    pub(crate) fn handle_gconprod(&mut self, record: &GconprodRecord) -> ScheduleResult<()> {
        const KW: &str = "GCONPROD";
        let step = self.current_step();
        let ids = self.resolve_groups(&record.group)?;
        let control = GroupProductionControl {
            cmode: parse_item(KW, "control mode", record.cmode.as_deref(), GroupProductionCMode::None, GroupProductionCMode::from_keyword)?,
            oil_target: non_negative(KW, "oil target", record.oil_target)?,
            water_target: non_negative(KW, "water target", record.water_target)?,
            gas_target: non_negative(KW, "gas target", record.gas_target)?,
            liquid_target: non_negative(KW, "liquid target", record.liquid_target)?,
            resv_target: non_negative(KW, "reservoir target", record.resv_target)?,
            exceed_action: parse_item(KW, "exceed action", record.exceed_action.as_deref(), ExceedAction::None, ExceedAction::from_keyword)?,
        };
        let guide_rate = group_guide_rate(KW, record.guide_rate, record.guide_rate_def.as_deref())?;

        for id in ids {
            let group = &mut self.groups[id.0];
            if group.production.set(step, control.clone())? {
                self.events.add_for(&group.name, step, ScheduleEvent::GroupProductionUpdate);
            }
            if let Some(gr) = &guide_rate {
                group.guide_rate.set(step, gr.clone())?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // GCONINJE
    // ========================================================================

    pub(crate) fn handle_gconinje(&mut self, record: &GconinjeRecord) -> ScheduleResult<()> {
        const KW: &str = "GCONINJE";
        let step = self.current_step();
        let ids = self.resolve_groups(&record.group)?;
        let control = GroupInjectionControl {
            phase: parse_required(KW, "phase", record.phase.as_deref(), Phase::from_keyword)?,
            cmode: parse_item(KW, "control mode", record.cmode.as_deref(), GroupInjectionCMode::None, GroupInjectionCMode::from_keyword)?,
            surface_target: non_negative(KW, "surface target", record.surface_target)?,
            resv_target: non_negative(KW, "reservoir target", record.resv_target)?,
            reinject_fraction: non_negative(KW, "reinjection fraction", record.reinject_target)?,
            voidage_fraction: non_negative(KW, "voidage fraction", record.voidage_target)?,
        };
        let guide_rate = group_guide_rate(KW, record.guide_rate, record.guide_rate_def.as_deref())?;

        for id in ids {
            let group = &mut self.groups[id.0];
            if group.injection.set(step, control.clone())? {
                self.events.add_for(&group.name, step, ScheduleEvent::GroupInjectionUpdate);
            }
            if let Some(gr) = &guide_rate {
                group.guide_rate.set(step, gr.clone())?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // GEFAC
    // ========================================================================

    pub(crate) fn handle_gefac(&mut self, record: &GefacRecord) -> ScheduleResult<()> {
        const KW: &str = "GEFAC";
        let step = self.current_step();
        let ids = self.resolve_groups(&record.group)?;
        let efficiency = GroupEfficiency {
            factor: non_negative(KW, "efficiency factor", record.efficiency_factor)?.unwrap_or(1.0),
            transfer_to_network: parse_item(KW, "network transfer flag", record.transfer_to_network.as_deref(), true, parse_yes_no)?,
        };
        for id in ids {
            let group = &mut self.groups[id.0];
            if group.efficiency.set(step, efficiency.clone())? {
                self.events.add_for(&group.name, step, ScheduleEvent::EfficiencyUpdate);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<GroupTimeline> {
        vec![
            GroupTimeline::new("FIELD", 0, None),
            GroupTimeline::new("PLAT", 0, Some(GroupId(0))),
            GroupTimeline::new("G1", 2, Some(GroupId(1))),
        ]
    }

    #[test]
    fn fld_walks_to_first_concrete_ancestor() {
        let mut groups = tree();
        let plat = GroupProductionControl {
            cmode: GroupProductionCMode::Orat,
            oil_target: Some(1000.0),
            ..Default::default()
        };
        groups[1].production.set(0, plat.clone()).expect("in order");
        groups[2]
            .production
            .set(2, GroupProductionControl { cmode: GroupProductionCMode::Fld, ..Default::default() })
            .expect("in order");

        assert_eq!(effective_production(&groups, GroupId(2), 2), Some(plat));
        assert_eq!(effective_production(&groups, GroupId(2), 1), None);
    }

    #[test]
    fn fld_on_every_ancestor_yields_no_control() {
        let mut groups = tree();
        for g in groups.iter_mut() {
            let origin = g.creation_step;
            g.injection
                .set(origin, GroupInjectionControl { cmode: GroupInjectionCMode::Fld, ..Default::default() })
                .expect("in order");
        }
        let control = effective_injection(&groups, GroupId(2), 3).expect("exists");
        assert_eq!(control.cmode, GroupInjectionCMode::None);
    }

    #[test]
    fn snapshot_derives_children() {
        let groups = tree();
        let field = group_snapshot(&groups, &[], GroupId(0), 0).expect("root exists");
        assert!(field.is_root());
        assert_eq!(field.child_groups, vec!["PLAT".to_string()]);

        let plat_before = group_snapshot(&groups, &[], GroupId(1), 1).expect("exists");
        assert!(plat_before.child_groups.is_empty());
        let plat_after = group_snapshot(&groups, &[], GroupId(1), 2).expect("exists");
        assert_eq!(plat_after.child_groups, vec!["G1".to_string()]);
        assert!(group_snapshot(&groups, &[], GroupId(2), 1).is_none());
    }

    #[test]
    fn form_definition_sets_auto_recalculate() {
        let gr = group_guide_rate("GCONPROD", None, Some("FORM")).expect("valid").expect("set");
        assert!(gr.auto_recalculate);
        assert_eq!(gr.phase, GuideRatePhase::Undefined);
        assert_eq!(group_guide_rate("GCONPROD", None, None).expect("valid"), None);
    }
}
