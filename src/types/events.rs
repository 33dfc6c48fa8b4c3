//! Schedule change events

use serde::{Deserialize, Serialize};

/// Kind of change recorded at a report step, globally and per entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScheduleEvent {
    NewWell,
    NewGroup,
    WellStatusChange,
    CompletionChange,
    ProductionUpdate,
    InjectionUpdate,
    GroupChange,
    WellSwitchedInjectorProducer,
    WellWelspecsUpdate,
    EfficiencyUpdate,
    GroupProductionUpdate,
    GroupInjectionUpdate,
    TuningChange,
    VfpTableUpdate,
    OutputPolicyChange,
}

impl ScheduleEvent {
    pub fn short_code(&self) -> &'static str {
        match self {
            ScheduleEvent::NewWell => "NEW_WELL",
            ScheduleEvent::NewGroup => "NEW_GROUP",
            ScheduleEvent::WellStatusChange => "WELL_STATUS_CHANGE",
            ScheduleEvent::CompletionChange => "COMPLETION_CHANGE",
            ScheduleEvent::ProductionUpdate => "PRODUCTION_UPDATE",
            ScheduleEvent::InjectionUpdate => "INJECTION_UPDATE",
            ScheduleEvent::GroupChange => "GROUP_CHANGE",
            ScheduleEvent::WellSwitchedInjectorProducer => "WELL_SWITCHED_INJECTOR_PRODUCER",
            ScheduleEvent::WellWelspecsUpdate => "WELL_WELSPECS_UPDATE",
            ScheduleEvent::EfficiencyUpdate => "EFFICIENCY_UPDATE",
            ScheduleEvent::GroupProductionUpdate => "GROUP_PRODUCTION_UPDATE",
            ScheduleEvent::GroupInjectionUpdate => "GROUP_INJECTION_UPDATE",
            ScheduleEvent::TuningChange => "TUNING_CHANGE",
            ScheduleEvent::VfpTableUpdate => "VFP_TABLE_UPDATE",
            ScheduleEvent::OutputPolicyChange => "OUTPUT_POLICY_CHANGE",
        }
    }
}

impl std::fmt::Display for ScheduleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_code())
    }
}
