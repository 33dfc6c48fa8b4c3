//! Production and injection control keywords.
//!
//! Every control record rebuilds the control set of the role it addresses
//! from scratch. Each record is checked against every matched well before
//! anything is committed.

use super::builder::{non_negative, parse_item, parse_required, parse_yes_no, ScheduleBuilder};
use super::vfp::VfpKind;
use super::WellId;
use crate::deck::{
    WconhistRecord, WconinjeRecord, WconinjhRecord, WconprodRecord, WeltargRecord, WhistctlRecord,
};
use crate::error::{ScheduleError, ScheduleResult};
use crate::types::{
    InjectorCMode, InjectorType, ProducerCMode, ScheduleEvent, WellInjectionProperties,
    WellProductionProperties, WellRole, WellStatus,
};
use tracing::{debug, info};

/// A validated per-well change waiting to be committed
struct ProductionPlan {
    id: WellId,
    props: WellProductionProperties,
    status: WellStatus,
}

struct InjectionPlan {
    id: WellId,
    props: WellInjectionProperties,
    status: WellStatus,
}

enum TargetChange {
    Production(WellProductionProperties),
    Injection(WellInjectionProperties),
    GuideRate(f64),
}

fn check_rates(keyword: &str, items: &[(&str, Option<f64>)]) -> ScheduleResult<()> {
    for (item, value) in items {
        non_negative(keyword, item, *value)?;
    }
    Ok(())
}

impl ScheduleBuilder {
    // ========================================================================
    // Commit helpers
    // ========================================================================

    /// Switch a well's role, clearing the control set of the role it leaves
    fn set_role(&mut self, id: WellId, role: WellRole) -> ScheduleResult<()> {
        let step = self.current_step();
        let well = &mut self.wells[id.0];
        if *well.role.current() == role {
            return Ok(());
        }
        well.role.set(step, role)?;
        match role {
            WellRole::Producer => well.injection.set(step, WellInjectionProperties::default())?,
            WellRole::Injector => well.production.set(step, WellProductionProperties::default())?,
        };
        info!(well = %well.name, step, role = ?role, "Well switched role");
        self.events
            .add_for(&well.name, step, ScheduleEvent::WellSwitchedInjectorProducer);
        Ok(())
    }

    fn commit_production(&mut self, plan: ProductionPlan) -> ScheduleResult<()> {
        let step = self.current_step();
        self.set_role(plan.id, WellRole::Producer)?;
        let well = &mut self.wells[plan.id.0];
        if well.production.set(step, plan.props)? {
            self.events.add_for(&well.name, step, ScheduleEvent::ProductionUpdate);
        }
        self.set_well_status(plan.id, plan.status)?;
        Ok(())
    }

    fn commit_injection(&mut self, plan: InjectionPlan) -> ScheduleResult<()> {
        let step = self.current_step();
        self.set_role(plan.id, WellRole::Injector)?;
        let well = &mut self.wells[plan.id.0];
        if well.injection.set(step, plan.props)? {
            self.events.add_for(&well.name, step, ScheduleEvent::InjectionUpdate);
        }
        self.set_well_status(plan.id, plan.status)?;
        Ok(())
    }

    /// Shut a crossflow-banned well whose rates are all zero
    fn crossflow_status(&self, id: WellId, status: WellStatus, zero_rate: bool) -> WellStatus {
        let well = &self.wells[id.0];
        if !well.allow_crossflow && zero_rate && status != WellStatus::Shut {
            info!(
                well = %well.name,
                step = self.current_step(),
                "Crossflow is banned and all rates are zero; well is shut"
            );
            return WellStatus::Shut;
        }
        status
    }

    // ========================================================================
    // WCONPROD
    // ========================================================================

    pub(crate) fn handle_wconprod(&mut self, record: &WconprodRecord) -> ScheduleResult<()> {
        const KW: &str = "WCONPROD";
        let ids = self.resolve_wells(&record.well)?;
        let status = parse_item(KW, "status", record.status.as_deref(), WellStatus::Open, WellStatus::from_keyword)?;
        let cmode = parse_required(KW, "control mode", record.cmode.as_deref(), ProducerCMode::from_keyword)?;
        let limits = [
            (ProducerCMode::Orat, record.orat),
            (ProducerCMode::Wrat, record.wrat),
            (ProducerCMode::Grat, record.grat),
            (ProducerCMode::Lrat, record.lrat),
            (ProducerCMode::Resv, record.resv),
            (ProducerCMode::Bhp, record.bhp),
            (ProducerCMode::Thp, record.thp),
        ];
        check_rates(
            KW,
            &[
                ("ORAT", record.orat),
                ("WRAT", record.wrat),
                ("GRAT", record.grat),
                ("LRAT", record.lrat),
                ("RESV", record.resv),
                ("BHP", record.bhp),
                ("THP", record.thp),
                ("ALQ", record.alq),
            ],
        )?;

        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            let well = &self.wells[id.0];
            let was_producer = *well.role.current() == WellRole::Producer;

            let mut props = WellProductionProperties {
                prediction_mode: true,
                alq_value: record.alq.unwrap_or(0.0),
                ..Default::default()
            };
            for (control, value) in limits {
                if let Some(v) = value {
                    props.set_target(control, v);
                }
            }
            if *well.group_controlled.current() {
                props.controls.insert(ProducerCMode::Grup);
            }
            let previous_vfp = if was_producer { well.production.current().vfp_table } else { 0 };
            props.vfp_table =
                self.vfp_table_number(VfpKind::Production, KW, record.vfp_table, previous_vfp)?;

            if props.has_control(cmode) {
                props.control_mode = Some(cmode);
            } else if status != WellStatus::Shut {
                return Err(ScheduleError::malformed(
                    KW,
                    format!("control mode {cmode} is not available for well {}", well.name),
                ));
            }
            plans.push(ProductionPlan { id, props, status });
        }

        for plan in plans {
            self.commit_production(plan)?;
        }
        Ok(())
    }

    // ========================================================================
    // WCONHIST
    // ========================================================================

    pub(crate) fn handle_wconhist(&mut self, record: &WconhistRecord) -> ScheduleResult<()> {
        const KW: &str = "WCONHIST";
        let ids = self.resolve_wells(&record.well)?;
        let status = parse_item(KW, "status", record.status.as_deref(), WellStatus::Open, WellStatus::from_keyword)?;
        let record_cmode = parse_required(KW, "control mode", record.cmode.as_deref(), |s| {
            ProducerCMode::from_keyword(s).filter(ProducerCMode::is_history_rate_channel)
        })?;
        check_rates(
            KW,
            &[
                ("ORAT", record.orat),
                ("WRAT", record.wrat),
                ("GRAT", record.grat),
                ("THP", record.thp),
                ("BHP", record.bhp),
                ("ALQ", record.alq),
            ],
        )?;
        let cmode = self.history_hint.unwrap_or(record_cmode);

        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            let well = &self.wells[id.0];
            let was_producer = *well.role.current() == WellRole::Producer;
            let previous = well.production.current();

            let oil = record.orat.unwrap_or(0.0);
            let water = record.wrat.unwrap_or(0.0);
            let mut props = WellProductionProperties {
                oil_rate: oil,
                water_rate: water,
                gas_rate: record.grat.unwrap_or(0.0),
                liquid_rate: oil + water,
                bhp_history: record.bhp.unwrap_or(0.0),
                thp_history: record.thp.unwrap_or(0.0),
                bhp_limit: if was_producer { previous.bhp_limit } else { 0.0 },
                alq_value: record.alq.unwrap_or(0.0),
                prediction_mode: false,
                control_mode: Some(cmode),
                ..Default::default()
            };
            props.controls.insert(cmode);
            props.controls.insert(ProducerCMode::Bhp);
            let previous_vfp = if was_producer { previous.vfp_table } else { 0 };
            props.vfp_table =
                self.vfp_table_number(VfpKind::Production, KW, record.vfp_table, previous_vfp)?;

            let status = self.crossflow_status(id, status, props.total_surface_rate() == 0.0);
            plans.push(ProductionPlan { id, props, status });
        }

        for plan in plans {
            self.commit_production(plan)?;
        }
        Ok(())
    }

    // ========================================================================
    // WCONINJE
    // ========================================================================

    pub(crate) fn handle_wconinje(&mut self, record: &WconinjeRecord) -> ScheduleResult<()> {
        const KW: &str = "WCONINJE";
        let ids = self.resolve_wells(&record.well)?;
        let injector_type =
            parse_required(KW, "injector type", record.injector_type.as_deref(), InjectorType::from_keyword)?;
        let status = parse_item(KW, "status", record.status.as_deref(), WellStatus::Open, WellStatus::from_keyword)?;
        let cmode = parse_required(KW, "control mode", record.cmode.as_deref(), InjectorCMode::from_keyword)?;
        check_rates(
            KW,
            &[("RATE", record.rate), ("RESV", record.resv), ("BHP", record.bhp), ("THP", record.thp)],
        )?;
        let limits = [
            (InjectorCMode::Rate, record.rate),
            (InjectorCMode::Resv, record.resv),
            (InjectorCMode::Bhp, record.bhp),
            (InjectorCMode::Thp, record.thp),
        ];

        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            let well = &self.wells[id.0];
            let was_injector = *well.role.current() == WellRole::Injector;

            let mut props = WellInjectionProperties {
                injector_type,
                prediction_mode: true,
                ..Default::default()
            };
            for (control, value) in limits {
                if let Some(v) = value {
                    props.set_target(control, v);
                }
            }
            if *well.group_controlled.current() {
                props.controls.insert(InjectorCMode::Grup);
            }
            let previous_vfp = if was_injector { well.injection.current().vfp_table } else { 0 };
            props.vfp_table =
                self.vfp_table_number(VfpKind::Injection, KW, record.vfp_table, previous_vfp)?;

            if props.has_control(cmode) {
                props.control_mode = Some(cmode);
            } else if status != WellStatus::Shut {
                return Err(ScheduleError::malformed(
                    KW,
                    format!("control mode {cmode} is not available for well {}", well.name),
                ));
            }

            let status = self.crossflow_status(id, status, props.surface_rate == 0.0);
            plans.push(InjectionPlan { id, props, status });
        }

        for plan in plans {
            self.commit_injection(plan)?;
        }
        Ok(())
    }

    // ========================================================================
    // WCONINJH
    // ========================================================================

    pub(crate) fn handle_wconinjh(&mut self, record: &WconinjhRecord) -> ScheduleResult<()> {
        const KW: &str = "WCONINJH";
        let ids = self.resolve_wells(&record.well)?;
        let injector_type =
            parse_required(KW, "injector type", record.injector_type.as_deref(), InjectorType::from_keyword)?;
        let status = parse_item(KW, "status", record.status.as_deref(), WellStatus::Open, WellStatus::from_keyword)?;
        let cmode = parse_item(KW, "control mode", record.cmode.as_deref(), InjectorCMode::Rate, |s| {
            InjectorCMode::from_keyword(s)
                .filter(|c| matches!(c, InjectorCMode::Rate | InjectorCMode::Resv))
        })?;
        check_rates(KW, &[("RATE", record.rate), ("BHP", record.bhp), ("THP", record.thp)])?;
        let rate = record.rate.unwrap_or(0.0);

        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            let well = &self.wells[id.0];
            let previous = well.injection.current();
            let was_injector = *well.role.current() == WellRole::Injector;

            let mut props = WellInjectionProperties {
                injector_type,
                bhp_history: record.bhp.unwrap_or(0.0),
                thp_history: record.thp.unwrap_or(0.0),
                bhp_limit: if was_injector { previous.bhp_limit } else { 0.0 },
                vfp_table: if was_injector { previous.vfp_table } else { 0 },
                prediction_mode: false,
                control_mode: Some(cmode),
                ..Default::default()
            };
            match cmode {
                InjectorCMode::Resv => props.reservoir_rate = rate,
                _ => props.surface_rate = rate,
            }
            props.controls.insert(cmode);
            props.controls.insert(InjectorCMode::Bhp);

            let status = self.crossflow_status(id, status, rate == 0.0);
            plans.push(InjectionPlan { id, props, status });
        }

        for plan in plans {
            self.commit_injection(plan)?;
        }
        Ok(())
    }

    // ========================================================================
    // WHISTCTL
    // ========================================================================

    pub(crate) fn handle_whistctl(&mut self, record: &WhistctlRecord) -> ScheduleResult<()> {
        const KW: &str = "WHISTCTL";
        let hint = parse_item(KW, "control mode", record.cmode.as_deref(), None, |s| {
            if s.eq_ignore_ascii_case("NONE") {
                return Some(None);
            }
            ProducerCMode::from_keyword(s)
                .filter(ProducerCMode::is_history_rate_channel)
                .map(Some)
        })?;
        let terminate =
            parse_item(KW, "BHP termination flag", record.bhp_terminate.as_deref(), false, parse_yes_no)?;
        if terminate {
            self.lenient(
                self.config.parse.unsupported_whistctl_terminate,
                KW,
                "terminating the run on a BHP violation is not supported".to_string(),
            )?;
        }

        self.history_hint = hint;
        debug!(step = self.current_step(), hint = ?hint, "History control hint set");
        Ok(())
    }

    // ========================================================================
    // WELTARG
    // ========================================================================

    pub(crate) fn handle_weltarg(&mut self, record: &WeltargRecord) -> ScheduleResult<()> {
        const KW: &str = "WELTARG";
        let step = self.current_step();
        let ids = self.resolve_wells(&record.well)?;
        let value = non_negative(KW, "target value", record.value)?
            .ok_or_else(|| ScheduleError::malformed(KW, "target value is required"))?;
        let mode = record.cmode.trim().to_uppercase();

        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            let well = &self.wells[id.0];
            let change = match mode.as_str() {
                "GUID" => TargetChange::GuideRate(value),
                _ => match *well.role.current() {
                    WellRole::Producer => {
                        let mut props = well.production.current().clone();
                        match mode.as_str() {
                            "VFP" => {
                                props.vfp_table = self.vfp_table_number(
                                    VfpKind::Production,
                                    KW,
                                    Some(table_number(KW, value)?),
                                    props.vfp_table,
                                )?;
                            }
                            "LIFT" => props.alq_value = value,
                            other => {
                                let cmode = ProducerCMode::from_keyword(other)
                                    .filter(|c| !matches!(c, ProducerCMode::Crat | ProducerCMode::Grup))
                                    .ok_or_else(|| {
                                        ScheduleError::malformed(KW, format!("unsupported target '{other}'"))
                                    })?;
                                props.set_target(cmode, value);
                            }
                        }
                        TargetChange::Production(props)
                    }
                    WellRole::Injector => {
                        let mut props = well.injection.current().clone();
                        match mode.as_str() {
                            "BHP" => props.set_target(InjectorCMode::Bhp, value),
                            "THP" => props.set_target(InjectorCMode::Thp, value),
                            "RESV" => props.set_target(InjectorCMode::Resv, value),
                            "ORAT" | "WRAT" | "GRAT" => {
                                let expected = match mode.as_str() {
                                    "ORAT" => InjectorType::Oil,
                                    "WRAT" => InjectorType::Water,
                                    _ => InjectorType::Gas,
                                };
                                if props.injector_type != expected {
                                    return Err(ScheduleError::invalid(format!(
                                        "WELTARG {mode} does not match the injector type of well {}",
                                        well.name
                                    )));
                                }
                                props.set_target(InjectorCMode::Rate, value);
                            }
                            "VFP" => {
                                props.vfp_table = self.vfp_table_number(
                                    VfpKind::Injection,
                                    KW,
                                    Some(table_number(KW, value)?),
                                    props.vfp_table,
                                )?;
                            }
                            other => {
                                return Err(ScheduleError::malformed(
                                    KW,
                                    format!("unsupported injector target '{other}'"),
                                ))
                            }
                        }
                        TargetChange::Injection(props)
                    }
                },
            };
            plans.push((id, change));
        }

        for (id, change) in plans {
            let well = &mut self.wells[id.0];
            let (changed, event) = match change {
                TargetChange::Production(props) => {
                    (well.production.set(step, props)?, ScheduleEvent::ProductionUpdate)
                }
                TargetChange::Injection(props) => {
                    (well.injection.set(step, props)?, ScheduleEvent::InjectionUpdate)
                }
                TargetChange::GuideRate(v) => (
                    well.guide_rate.update(step, |gr| {
                        gr.value = Some(v);
                        gr.auto_recalculate = false;
                    })?,
                    ScheduleEvent::ProductionUpdate,
                ),
            };
            if changed {
                self.events.add_for(&well.name, step, event);
            }
        }
        Ok(())
    }
}

/// A table number carried in a floating-point item
fn table_number(keyword: &str, value: f64) -> ScheduleResult<i32> {
    if value.fract() != 0.0 || value > i32::MAX as f64 {
        return Err(ScheduleError::malformed(
            keyword,
            format!("table number must be a whole number, got {value}"),
        ));
    }
    Ok(value as i32)
}
