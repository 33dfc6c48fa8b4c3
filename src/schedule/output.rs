//! Output scheduling: per-well RFT triggers (`WRFT`, `WRFTPLT`) and the
//! global restart policy (`RPTRST`, `RPTSCHED`).

use super::builder::{parse_item, ScheduleBuilder};
use super::dynamic_state::DynamicState;
use super::time_map::TimeMap;
use super::wells::WellTimeline;
use crate::deck::{MnemonicRecord, WrftRecord, WrftpltRecord};
use crate::error::{ScheduleError, ScheduleResult};
use crate::types::{ScheduleEvent, WellStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// RFT Output
// ============================================================================

/// When RFT data is written for a well
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum RftMode {
    #[default]
    Never,
    /// At the step the request was made
    Once,
    /// At every step the well is open
    Always,
    /// At the first step the well is open
    FirstOpen,
}

impl RftMode {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "YES" => Some(RftMode::Once),
            "REPT" | "TIMESTEP" => Some(RftMode::Always),
            "FOPN" => Some(RftMode::FirstOpen),
            "NO" => Some(RftMode::Never),
            _ => None,
        }
    }
}

/// Whether RFT output is due for a well at `step`.
///
/// `open_armed` is the step of the first `WRFT`, which arms first-open
/// output for every well, including wells defined later.
pub(crate) fn rft_due(well: &WellTimeline, step: usize, open_armed: Option<usize>) -> bool {
    if !well.exists_at(step) {
        return false;
    }
    let open = well.status.at(step) == Some(&WellStatus::Open);
    let requested = match well.rft.entry_at(step) {
        Some((set_at, RftMode::Once)) => set_at == step,
        Some((_, RftMode::Always)) => open,
        _ => false,
    };
    requested
        || [well.rft_first_open_from, open_armed]
            .into_iter()
            .flatten()
            .any(|armed| first_open_due(well, step, armed))
}

/// First step at or after `armed` with the well open
fn first_open_due(well: &WellTimeline, step: usize, armed: usize) -> bool {
    if step < armed || well.status.at(step) != Some(&WellStatus::Open) {
        return false;
    }
    !(armed..step).any(|s| well.status.at(s) == Some(&WellStatus::Open))
}

// ============================================================================
// Restart Output
// ============================================================================

/// Restart write policy: `basic` selects the rule, `freq` its period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestartPolicy {
    pub basic: u32,
    pub freq: u32,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self { basic: 0, freq: 1 }
    }
}

impl RestartPolicy {
    fn period(&self) -> usize {
        self.freq.max(1) as usize
    }

    /// Whether a restart file is written at `step`, for a policy set at `origin`
    pub fn writes_at(&self, origin: usize, step: usize, time_map: &TimeMap) -> ScheduleResult<bool> {
        use chrono::Datelike;

        let period = self.period();
        match self.basic {
            0 => Ok(false),
            1 | 2 | 6 => Ok(true),
            3 => Ok((step - origin) % period == 0),
            4 => {
                if !time_map.is_first_step_in_year(step)? {
                    return Ok(false);
                }
                let years = time_map.time(step)?.year() - time_map.time(origin)?.year();
                Ok(years as usize % period == 0)
            }
            5 => {
                if !time_map.is_first_step_in_month(step)? {
                    return Ok(false);
                }
                let (from, to) = (time_map.time(origin)?, time_map.time(step)?);
                let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
                Ok(months as usize % period == 0)
            }
            other => Err(ScheduleError::invalid(format!("unknown restart policy BASIC={other}"))),
        }
    }
}

/// Split `NAME=value` mnemonics; bare words map to an empty value
fn mnemonics(record: &MnemonicRecord) -> impl Iterator<Item = (String, &str)> {
    record.mnemonics.iter().map(|m| match m.split_once('=') {
        Some((k, v)) => (k.trim().to_uppercase(), v.trim()),
        None => (m.trim().to_uppercase(), ""),
    })
}

fn is_integer_form(record: &MnemonicRecord) -> bool {
    !record.mnemonics.is_empty() && record.mnemonics.iter().all(|m| m.trim().parse::<i64>().is_ok())
}

fn parse_count(keyword: &str, item: &str, value: &str) -> ScheduleResult<u32> {
    value
        .parse::<u32>()
        .map_err(|_| ScheduleError::malformed(keyword, format!("invalid {item} '{value}'")))
}

fn integer_item(keyword: &str, record: &MnemonicRecord, idx: usize) -> ScheduleResult<Option<u32>> {
    record
        .mnemonics
        .get(idx)
        .map(|v| parse_count(keyword, "integer control", v.trim()))
        .transpose()
}

impl ScheduleBuilder {
    fn set_restart_policy(&mut self, policy: RestartPolicy) -> ScheduleResult<()> {
        let step = self.current_step();
        if policy.basic > 6 {
            return Err(ScheduleError::invalid(format!("unknown restart policy BASIC={}", policy.basic)));
        }
        if self.restart.set(step, policy)? {
            self.events.add(step, ScheduleEvent::OutputPolicyChange);
            debug!(step, basic = policy.basic, freq = policy.freq, "Restart policy changed");
        }
        Ok(())
    }

    // ========================================================================
    // RPTRST / RPTSCHED
    // ========================================================================

    pub(crate) fn handle_rptrst(&mut self, record: &MnemonicRecord) -> ScheduleResult<()> {
        const KW: &str = "RPTRST";
        let mut policy = *self.restart.current();
        if is_integer_form(record) {
            if let Some(basic) = integer_item(KW, record, 0)? {
                policy.basic = basic;
            }
            if let Some(freq) = integer_item(KW, record, 5)? {
                policy.freq = freq;
            }
        } else {
            for (name, value) in mnemonics(record) {
                match name.as_str() {
                    "BASIC" => policy.basic = parse_count(KW, "BASIC", value)?,
                    "FREQ" => policy.freq = parse_count(KW, "FREQ", value)?,
                    other => debug!(mnemonic = other, "Restart mnemonic has no schedule effect"),
                }
            }
        }
        self.set_restart_policy(policy)
    }

    pub(crate) fn handle_rptsched(&mut self, record: &MnemonicRecord) -> ScheduleResult<()> {
        const KW: &str = "RPTSCHED";
        let mut restart = None;
        if is_integer_form(record) {
            restart = integer_item(KW, record, 6)?;
        } else {
            for (name, value) in mnemonics(record) {
                match name.as_str() {
                    "RESTART" => restart = Some(parse_count(KW, "RESTART", value)?),
                    "NOTHING" => restart = Some(0),
                    _ => {}
                }
            }
        }
        let Some(restart) = restart else {
            return Ok(());
        };
        let policy = RestartPolicy {
            basic: u32::from(restart >= 1),
            freq: 1,
        };
        self.set_restart_policy(policy)
    }

    // ========================================================================
    // WRFT / WRFTPLT
    // ========================================================================

    pub(crate) fn handle_wrft(&mut self, records: &[WrftRecord]) -> ScheduleResult<()> {
        let step = self.current_step();
        let mut named = Vec::new();
        for record in records.iter().filter(|r| !r.well.trim().is_empty()) {
            named.extend(self.resolve_wells(&record.well)?);
        }
        for id in named {
            self.wells[id.0].rft.set(step, RftMode::Once)?;
        }
        self.rft_open_armed.get_or_insert(step);
        self.events.add(step, ScheduleEvent::OutputPolicyChange);
        Ok(())
    }

    pub(crate) fn handle_wrftplt(&mut self, record: &WrftpltRecord) -> ScheduleResult<()> {
        let step = self.current_step();
        let ids = self.resolve_wells(&record.well)?;
        let mode = parse_item("WRFTPLT", "RFT output mode", record.output_rft.as_deref(), RftMode::Never, RftMode::from_keyword)?;
        for id in ids {
            let well = &mut self.wells[id.0];
            match mode {
                RftMode::FirstOpen => {
                    well.rft_first_open_from.get_or_insert(step);
                }
                RftMode::Never => well.rft_first_open_from = None,
                RftMode::Once | RftMode::Always => {}
            }
            well.rft.set(step, mode)?;
        }
        self.events.add(step, ScheduleEvent::OutputPolicyChange);
        Ok(())
    }
}

/// Whether a restart file is due at `step` under a policy timeline
pub(crate) fn restart_due(
    restart: &DynamicState<RestartPolicy>,
    step: usize,
    time_map: &TimeMap,
) -> ScheduleResult<bool> {
    match restart.entry_at(step) {
        Some((origin, policy)) => policy.writes_at(origin, step, time_map),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    fn monthly() -> TimeMap {
        let mut tm = TimeMap::new(date(2020, 1, 1));
        for (y, m, d) in [(2020, 1, 15), (2020, 2, 1), (2020, 3, 1), (2020, 3, 20), (2021, 1, 1)] {
            tm.add_date(date(y, m, d)).expect("later");
        }
        tm
    }

    #[test]
    fn every_nth_step_from_policy_start() {
        let tm = monthly();
        let policy = RestartPolicy { basic: 3, freq: 2 };
        let due: Vec<bool> = (1..6)
            .map(|s| policy.writes_at(1, s, &tm).expect("in range"))
            .collect();
        assert_eq!(due, vec![true, false, true, false, true]);
    }

    #[test]
    fn first_step_of_month() {
        let tm = monthly();
        let policy = RestartPolicy { basic: 5, freq: 1 };
        assert!(!policy.writes_at(0, 1, &tm).expect("in range"));
        assert!(policy.writes_at(0, 2, &tm).expect("in range"));
        assert!(!policy.writes_at(0, 4, &tm).expect("in range"));
    }

    #[test]
    fn first_step_of_year_and_zero_frequency() {
        let tm = monthly();
        let policy = RestartPolicy { basic: 4, freq: 0 };
        assert!(policy.writes_at(0, 5, &tm).expect("in range"));
        assert!(!policy.writes_at(0, 3, &tm).expect("in range"));
    }

    #[test]
    fn basic_zero_never_writes() {
        let tm = monthly();
        let policy = RestartPolicy::default();
        assert!((0..6).all(|s| !policy.writes_at(0, s, &tm).expect("in range")));
    }

    #[test]
    fn mnemonic_forms() {
        let named = MnemonicRecord { mnemonics: vec!["BASIC=3".into(), "FREQ=2".into()] };
        assert!(!is_integer_form(&named));
        let pairs: Vec<(String, &str)> = mnemonics(&named).collect();
        assert_eq!(pairs[0], ("BASIC".to_string(), "3"));

        let ints = MnemonicRecord { mnemonics: vec!["2".into(), "0".into()] };
        assert!(is_integer_form(&ints));
        assert_eq!(integer_item("RPTRST", &ints, 0).expect("valid"), Some(2));
        assert_eq!(integer_item("RPTRST", &ints, 5).expect("valid"), None);
    }
}
