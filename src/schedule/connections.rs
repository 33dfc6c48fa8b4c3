//! Completion keywords: `COMPDAT`, `COMPLUMP` and `WELOPEN`.
//!
//! Connections are never removed. New cells get completion numbers after the
//! well's current maximum; a repeated cell keeps its number.

use super::builder::{non_negative, parse_item, ScheduleBuilder};
use super::WellId;
use crate::deck::{CompdatRecord, ComplumpRecord, WelopenRecord};
use crate::error::{ScheduleError, ScheduleResult};
use crate::types::{
    Connection, ConnectionState, Direction, ScheduleEvent, WellConnections, WellStatus,
};
use tracing::{debug, info};

/// Inclusive 0-based range on one grid axis; `None` matches every index
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisFilter(Option<(usize, usize)>);

impl AxisFilter {
    /// A 1-based deck coordinate where 0 or defaulted is a wildcard
    fn single(keyword: &str, item: &str, value: Option<i32>) -> ScheduleResult<Self> {
        match value {
            None | Some(0) => Ok(AxisFilter(None)),
            Some(v) if v < 0 => Err(ScheduleError::invalid(format!(
                "{keyword} {item} must not be negative, got {v}"
            ))),
            Some(v) => {
                let idx = (v - 1) as usize;
                Ok(AxisFilter(Some((idx, idx))))
            }
        }
    }

    fn range(keyword: &str, lower: Option<i32>, upper: Option<i32>) -> ScheduleResult<Self> {
        let lo = AxisFilter::single(keyword, "K1", lower)?.0.map(|(l, _)| l);
        let hi = AxisFilter::single(keyword, "K2", upper)?.0.map(|(h, _)| h);
        match (lo, hi) {
            (None, None) => Ok(AxisFilter(None)),
            (lo, hi) => {
                let (lo, hi) = (lo.unwrap_or(0), hi.unwrap_or(usize::MAX));
                if lo > hi {
                    return Err(ScheduleError::invalid(format!(
                        "{keyword} K1 ({}) is greater than K2 ({})",
                        lo + 1,
                        hi + 1
                    )));
                }
                Ok(AxisFilter(Some((lo, hi))))
            }
        }
    }

    fn matches(&self, idx: usize) -> bool {
        self.0.map_or(true, |(lo, hi)| lo <= idx && idx <= hi)
    }
}

impl ScheduleBuilder {
    /// Force a well shut when it has connections and none of them is open
    fn enforce_connection_veto(&mut self, id: WellId) -> ScheduleResult<()> {
        let well = &self.wells[id.0];
        if well.connections.current().all_shut() && *well.status.current() != WellStatus::Shut {
            info!(well = %well.name, step = self.current_step(), "All connections shut; well is shut");
            self.set_well_status(id, WellStatus::Shut)?;
        }
        Ok(())
    }

    fn commit_connections(&mut self, plans: Vec<(WellId, WellConnections)>) -> ScheduleResult<()> {
        let step = self.current_step();
        for (id, connections) in plans {
            let well = &mut self.wells[id.0];
            if well.connections.set(step, connections)? {
                self.events.add_for(&well.name, step, ScheduleEvent::CompletionChange);
            }
            self.enforce_connection_veto(id)?;
        }
        Ok(())
    }

    // ========================================================================
    // COMPDAT
    // ========================================================================

    pub(crate) fn handle_compdat(&mut self, record: &CompdatRecord) -> ScheduleResult<()> {
        const KW: &str = "COMPDAT";
        let ids = self.resolve_wells(&record.well)?;

        let k1 = record.k1.ok_or_else(|| ScheduleError::malformed(KW, "K1 is required"))?;
        let k2 = record.k2.ok_or_else(|| ScheduleError::malformed(KW, "K2 is required"))?;
        if k1 < 1 || k2 < 1 {
            return Err(ScheduleError::invalid(format!("{KW} layers must be >= 1, got {k1}..{k2}")));
        }
        if k1 > k2 {
            return Err(ScheduleError::invalid(format!("{KW} K1 ({k1}) is greater than K2 ({k2})")));
        }
        let state = parse_item(KW, "state", record.state.as_deref(), ConnectionState::Open, ConnectionState::from_keyword)?;
        let direction = parse_item(KW, "direction", record.direction.as_deref(), Direction::Z, Direction::from_keyword)?;
        let sat_table_id = match record.sat_table {
            None | Some(0) => None,
            Some(v) if v < 0 => {
                return Err(ScheduleError::malformed(KW, format!("saturation table must be positive, got {v}")))
            }
            Some(v) => Some(v as u32),
        };
        let connection_factor = non_negative(KW, "connection factor", record.connection_factor)?;
        let diameter = non_negative(KW, "diameter", record.diameter)?;
        let kh = non_negative(KW, "Kh", record.kh)?;
        let skin_factor = match record.skin {
            Some(s) if !s.is_finite() => {
                return Err(ScheduleError::malformed(KW, format!("skin factor must be finite, got {s}")))
            }
            other => other.unwrap_or(0.0),
        };

        let grid = &self.config.grid;
        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            let well = &self.wells[id.0];
            let head = well.head.current();
            let i = match AxisFilter::single(KW, "I", record.i)?.0 {
                Some((idx, _)) => idx,
                None => head.i,
            };
            let j = match AxisFilter::single(KW, "J", record.j)?.0 {
                Some((idx, _)) => idx,
                None => head.j,
            };

            let mut connections = well.connections.current().clone();
            let mut next_complnum = connections.max_complnum() + 1;
            for k in (k1 - 1) as usize..=(k2 - 1) as usize {
                if !grid.contains(i, j, k) {
                    return Err(ScheduleError::invalid(format!(
                        "{KW} cell ({}, {}, {}) of well {} is outside the grid",
                        i + 1,
                        j + 1,
                        k + 1,
                        well.name
                    )));
                }
                let complnum = match connections.get(i, j, k) {
                    Some(existing) => existing.complnum,
                    None => {
                        next_complnum += 1;
                        next_complnum - 1
                    }
                };
                let connection = Connection {
                    i,
                    j,
                    k,
                    global_index: grid.global_index(i, j, k),
                    state,
                    direction,
                    complnum,
                    connection_factor,
                    diameter,
                    kh,
                    skin_factor,
                    sat_table_id,
                };
                match connections.connections.iter_mut().find(|c| c.same_cell(i, j, k)) {
                    Some(existing) => *existing = connection,
                    None => connections.connections.push(connection),
                }
            }
            debug!(well = %well.name, connections = connections.len(), "Completion data applied");
            plans.push((id, connections));
        }

        self.commit_connections(plans)
    }

    // ========================================================================
    // COMPLUMP
    // ========================================================================

    pub(crate) fn handle_complump(&mut self, record: &ComplumpRecord) -> ScheduleResult<()> {
        const KW: &str = "COMPLUMP";
        let ids = self.resolve_wells(&record.well)?;
        let complnum = record
            .complnum
            .ok_or_else(|| ScheduleError::malformed(KW, "completion number is required"))?;
        if complnum <= 0 {
            return Err(ScheduleError::invalid(format!(
                "{KW} completion number must be >= 1, got {complnum}"
            )));
        }
        let i = AxisFilter::single(KW, "I", record.i)?;
        let j = AxisFilter::single(KW, "J", record.j)?;
        let k = AxisFilter::range(KW, record.k1, record.k2)?;

        let plans = ids
            .into_iter()
            .map(|id| {
                let mut connections = self.wells[id.0].connections.current().clone();
                for c in connections.connections.iter_mut() {
                    if i.matches(c.i) && j.matches(c.j) && k.matches(c.k) {
                        c.complnum = complnum as u32;
                    }
                }
                (id, connections)
            })
            .collect();

        self.commit_connections(plans)
    }

    // ========================================================================
    // WELOPEN
    // ========================================================================

    /// Open or shut a well, or a subset of its connections.
    ///
    /// I/J/K/C1/C2 items equal to zero count as defaulted, so a record whose
    /// qualifiers are all zero acts on the whole well. A stricter reading
    /// would address connections whenever any of those items is given.
    pub(crate) fn handle_welopen(&mut self, record: &WelopenRecord) -> ScheduleResult<()> {
        const KW: &str = "WELOPEN";
        let ids = self.resolve_wells(&record.well)?;
        let status = parse_item(KW, "status", record.status.as_deref(), WellStatus::Open, WellStatus::from_keyword)?;

        let qualifiers = [record.i, record.j, record.k, record.c1, record.c2];
        if let Some(v) = qualifiers.iter().flatten().find(|v| **v < 0) {
            return Err(ScheduleError::invalid(format!("{KW} qualifiers must not be negative, got {v}")));
        }
        let has_qualifier = qualifiers.iter().flatten().any(|v| *v != 0);

        if !has_qualifier {
            let step = self.current_step();
            for id in ids {
                if status == WellStatus::Open {
                    let well = self.current_well(id)?;
                    if !well.can_open() {
                        info!(well = %well.name, step, "Crossflow banned and rates are zero; open request ignored");
                        continue;
                    }
                }
                self.set_well_status(id, status)?;
            }
            return Ok(());
        }

        let i = AxisFilter::single(KW, "I", record.i)?;
        let j = AxisFilter::single(KW, "J", record.j)?;
        let k = AxisFilter::single(KW, "K", record.k)?;
        let lowest = record.c1.filter(|c| *c > 0).map(|c| c as u32);
        let highest = record.c2.filter(|c| *c > 0).map(|c| c as u32);
        let state = ConnectionState::from_well_status(status);

        let plans = ids
            .into_iter()
            .map(|id| {
                let mut connections = self.wells[id.0].connections.current().clone();
                for c in connections.connections.iter_mut() {
                    let in_cells = i.matches(c.i) && j.matches(c.j) && k.matches(c.k);
                    let in_numbers = lowest.map_or(true, |lo| c.complnum >= lo)
                        && highest.map_or(true, |hi| c.complnum <= hi);
                    if in_cells && in_numbers {
                        c.state = state;
                    }
                }
                (id, connections)
            })
            .collect();

        self.commit_connections(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_filter_wildcards() {
        let any = AxisFilter::single("X", "I", Some(0)).expect("wildcard");
        assert!(any.matches(0));
        assert!(any.matches(99));

        let one = AxisFilter::single("X", "I", Some(3)).expect("single");
        assert!(one.matches(2));
        assert!(!one.matches(3));
    }

    #[test]
    fn axis_range_open_ends() {
        let upper_only = AxisFilter::range("X", None, Some(2)).expect("range");
        assert!(upper_only.matches(0));
        assert!(upper_only.matches(1));
        assert!(!upper_only.matches(2));

        assert!(AxisFilter::range("X", Some(4), Some(2)).is_err());
        assert!(AxisFilter::single("X", "I", Some(-1)).is_err());
    }
}
