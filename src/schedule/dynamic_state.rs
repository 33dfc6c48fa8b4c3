//! Temporal override container
//!
//! Holds one attribute of one entity as an ordered list of `(step, value)`
//! entries. A value is in force from its step until the next entry. Entries
//! are never reordered: a `set` at the step of the last entry replaces it, a
//! `set` at a later step appends, and a `set` at an earlier step is rejected.

use crate::error::{ScheduleError, ScheduleResult};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicState<T> {
    entries: Vec<(usize, T)>,
}

impl<T: Clone + PartialEq> DynamicState<T> {
    /// Start a timeline at `origin` with an initial value
    pub fn new(origin: usize, initial: T) -> Self {
        Self {
            entries: vec![(origin, initial)],
        }
    }

    /// First step with a value
    pub fn origin(&self) -> usize {
        self.entries[0].0
    }

    /// Value in force at `step`, `None` before the origin
    pub fn at(&self, step: usize) -> Option<&T> {
        self.entry_at(step).map(|(_, v)| v)
    }

    /// Value in force at `step` together with the step it was set at
    pub fn entry_at(&self, step: usize) -> Option<(usize, &T)> {
        let idx = self.entries.partition_point(|(s, _)| *s <= step);
        if idx == 0 {
            None
        } else {
            let (s, v) = &self.entries[idx - 1];
            Some((*s, v))
        }
    }

    /// Most recent value
    pub fn current(&self) -> &T {
        // entries is never empty
        &self.entries[self.entries.len() - 1].1
    }

    pub fn last_step(&self) -> usize {
        self.entries[self.entries.len() - 1].0
    }

    /// Make `value` effective from `step`.
    ///
    /// Returns whether the effective value at `step` changed.
    pub fn set(&mut self, step: usize, value: T) -> ScheduleResult<bool> {
        let last = self.last_step();
        if step < last {
            return Err(ScheduleError::invalid(format!(
                "cannot set a value at step {step} after one was set at step {last}"
            )));
        }
        let changed = *self.current() != value;
        if step == last {
            let idx = self.entries.len() - 1;
            self.entries[idx].1 = value;
        } else {
            self.entries.push((step, value));
        }
        Ok(changed)
    }

    /// Modify a copy of the current value and make it effective from `step`
    pub fn update<F>(&mut self, step: usize, f: F) -> ScheduleResult<bool>
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.current().clone();
        f(&mut value);
        self.set(step, value)
    }

    /// Whether an entry was written exactly at `step`
    pub fn has_entry_at(&self, step: usize) -> bool {
        self.entries.binary_search_by_key(&step, |(s, _)| *s).is_ok()
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries.iter().map(|(s, v)| (*s, v))
    }

    /// First step at or after `from` whose value satisfies `pred`
    pub fn find_from<P>(&self, from: usize, mut pred: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        if let Some((_, v)) = self.entry_at(from) {
            if pred(v) {
                return Some(from);
            }
        }
        self.entries
            .iter()
            .filter(|(s, _)| *s > from)
            .find(|(_, v)| pred(v))
            .map(|(s, _)| *s)
    }
}
