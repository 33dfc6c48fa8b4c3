//! Well and group name addressing: exact names, `*`/`?` globs and named well
//! lists (`WLIST`).

use crate::error::{EntityKind, ScheduleError, ScheduleResult};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// Name Patterns
// ============================================================================

#[derive(Debug, Clone)]
pub enum NamePattern {
    Exact(String),
    Glob { source: String, regex: Regex },
}

impl NamePattern {
    pub fn parse(pattern: &str) -> ScheduleResult<Self> {
        let pattern = pattern.trim();
        if !pattern.contains(['*', '?']) {
            return Ok(NamePattern::Exact(pattern.to_string()));
        }
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        for ch in pattern.chars() {
            match ch {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
            }
        }
        expr.push('$');
        let regex = Regex::new(&expr)
            .map_err(|e| ScheduleError::invalid(format!("bad name pattern '{pattern}': {e}")))?;
        Ok(NamePattern::Glob {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_glob(&self) -> bool {
        matches!(self, NamePattern::Glob { .. })
    }

    pub fn as_str(&self) -> &str {
        match self {
            NamePattern::Exact(name) => name,
            NamePattern::Glob { source, .. } => source,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Exact(exact) => exact == name,
            NamePattern::Glob { regex, .. } => regex.is_match(name),
        }
    }
}

// ============================================================================
// Well Lists
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WlistAction {
    New,
    Add,
    Del,
    Mov,
}

impl WlistAction {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NEW" => Some(WlistAction::New),
            "ADD" => Some(WlistAction::Add),
            "DEL" => Some(WlistAction::Del),
            "MOV" => Some(WlistAction::Mov),
            _ => None,
        }
    }
}

/// Named well lists in force at one step. Names start with `*`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WellLists {
    lists: BTreeMap<String, Vec<String>>,
}

impl WellLists {
    pub fn is_list_name(name: &str) -> bool {
        name.len() > 1 && name.starts_with('*')
    }

    pub fn has_list(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.lists.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    /// Apply one `WLIST` action. `wells` are already-resolved well names.
    pub fn apply(&mut self, list: &str, action: WlistAction, wells: &[String]) -> ScheduleResult<()> {
        if !Self::is_list_name(list) {
            return Err(ScheduleError::invalid(format!(
                "well list name '{list}' must start with '*'"
            )));
        }
        if action != WlistAction::New && !self.has_list(list) {
            return Err(ScheduleError::unknown(EntityKind::WellList, list));
        }

        match action {
            WlistAction::New => {
                let mut members = Vec::with_capacity(wells.len());
                for w in wells {
                    if !members.contains(w) {
                        members.push(w.clone());
                    }
                }
                self.lists.insert(list.to_string(), members);
            }
            WlistAction::Add => self.add_wells(list, wells),
            WlistAction::Del => {
                if let Some(members) = self.lists.get_mut(list) {
                    members.retain(|m| !wells.contains(m));
                }
            }
            WlistAction::Mov => {
                for members in self.lists.values_mut() {
                    members.retain(|m| !wells.contains(m));
                }
                self.add_wells(list, wells);
            }
        }
        Ok(())
    }

    fn add_wells(&mut self, list: &str, wells: &[String]) {
        if let Some(members) = self.lists.get_mut(list) {
            for w in wells {
                if !members.contains(w) {
                    members.push(w.clone());
                }
            }
        }
    }
}
