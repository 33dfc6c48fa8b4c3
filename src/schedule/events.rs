//! Per-step change log, global and per well/group

use crate::types::ScheduleEvent;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    global: BTreeMap<usize, BTreeSet<ScheduleEvent>>,
    entities: HashMap<String, BTreeMap<usize, BTreeSet<ScheduleEvent>>>,
}

impl EventLog {
    pub fn add(&mut self, step: usize, event: ScheduleEvent) {
        self.global.entry(step).or_default().insert(event);
    }

    /// Record an event for one entity; it is also recorded globally
    pub fn add_for(&mut self, name: &str, step: usize, event: ScheduleEvent) {
        self.add(step, event);
        self.entities
            .entry(name.to_string())
            .or_default()
            .entry(step)
            .or_default()
            .insert(event);
    }

    pub fn has_event(&self, event: ScheduleEvent, step: usize) -> bool {
        self.global.get(&step).is_some_and(|set| set.contains(&event))
    }

    pub fn events_at(&self, step: usize) -> BTreeSet<ScheduleEvent> {
        self.global.get(&step).cloned().unwrap_or_default()
    }

    pub fn entity_events(&self, name: &str, step: usize) -> BTreeSet<ScheduleEvent> {
        self.entities
            .get(name)
            .and_then(|steps| steps.get(&step))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_entity_event(&self, name: &str, event: ScheduleEvent, step: usize) -> bool {
        self.entities
            .get(name)
            .and_then(|steps| steps.get(&step))
            .is_some_and(|set| set.contains(&event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_events_are_also_global() {
        let mut log = EventLog::default();
        log.add_for("W1", 2, ScheduleEvent::WellStatusChange);
        log.add(3, ScheduleEvent::TuningChange);

        assert!(log.has_event(ScheduleEvent::WellStatusChange, 2));
        assert!(log.has_entity_event("W1", ScheduleEvent::WellStatusChange, 2));
        assert!(!log.has_entity_event("W2", ScheduleEvent::WellStatusChange, 2));
        assert!(log.entity_events("W1", 3).is_empty());
        assert_eq!(log.events_at(3).len(), 1);
    }
}
