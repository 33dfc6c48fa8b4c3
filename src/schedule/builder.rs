//! Schedule builder: folds deck keywords, in deck order, into per-entity
//! timelines. `finish()` turns it into the read-only `Schedule`.

use super::dynamic_state::DynamicState;
use super::events::EventLog;
use super::groups::GroupTimeline;
use super::name_pattern::{NamePattern, WellLists};
use super::numerics::{OilVaporizationProperties, TuningParameters};
use super::output::RestartPolicy;
use super::vfp::VfpRegistry;
use super::view::Schedule;
use super::well_test::WellTestConfig;
use super::wells::WellTimeline;
use super::{GroupId, WellId};
use crate::config::{LeniencyAction, ScheduleConfig};
use crate::deck::{Deck, DeckKeyword};
use crate::error::{EntityKind, ScheduleError, ScheduleResult};
use crate::types::ProducerCMode;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Mutable accumulation of schedule state.
///
/// Records are applied one at a time against the cumulative state. A record
/// that fails validation leaves the builder exactly as it was before the
/// record; earlier records of the same keyword stay applied.
pub struct ScheduleBuilder {
    pub(crate) config: ScheduleConfig,
    pub(crate) time_map: super::TimeMap,
    pub(crate) wells: Vec<WellTimeline>,
    pub(crate) well_index: HashMap<String, WellId>,
    pub(crate) groups: Vec<GroupTimeline>,
    pub(crate) group_index: HashMap<String, GroupId>,
    pub(crate) well_lists: DynamicState<WellLists>,
    pub(crate) history_hint: Option<ProducerCMode>,
    pub(crate) restart: DynamicState<RestartPolicy>,
    /// Step of the first `WRFT`; arms first-open RFT output for all wells
    pub(crate) rft_open_armed: Option<usize>,
    pub(crate) well_tests: DynamicState<WellTestConfig>,
    pub(crate) vfp_prod: VfpRegistry,
    pub(crate) vfp_inj: VfpRegistry,
    pub(crate) vaporization: DynamicState<OilVaporizationProperties>,
    pub(crate) tuning: DynamicState<TuningParameters>,
    pub(crate) events: EventLog,
}

impl ScheduleBuilder {
    pub fn new(start: NaiveDateTime, config: &ScheduleConfig) -> Self {
        let mut builder = Self {
            config: config.clone(),
            time_map: super::TimeMap::new(start),
            wells: Vec::new(),
            well_index: HashMap::new(),
            groups: Vec::new(),
            group_index: HashMap::new(),
            well_lists: DynamicState::new(0, WellLists::default()),
            history_hint: None,
            restart: DynamicState::new(0, RestartPolicy::default()),
            rft_open_armed: None,
            well_tests: DynamicState::new(0, WellTestConfig::default()),
            vfp_prod: VfpRegistry::default(),
            vfp_inj: VfpRegistry::default(),
            vaporization: DynamicState::new(0, OilVaporizationProperties::default()),
            tuning: DynamicState::new(0, TuningParameters::default()),
            events: EventLog::default(),
        };
        let root = builder.config.groups.root.clone();
        builder.create_group(&root, None);
        builder
    }

    /// Step that records are currently applied to
    pub fn current_step(&self) -> usize {
        self.time_map.last_step()
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Apply every keyword of a deck in order, stopping at the first error
    pub fn apply_deck(&mut self, deck: &Deck) -> ScheduleResult<()> {
        for keyword in &deck.keywords {
            self.apply(keyword)?;
        }
        info!(
            report_steps = self.time_map.num_steps(),
            wells = self.wells.len(),
            groups = self.groups.len(),
            "Schedule constructed"
        );
        Ok(())
    }

    /// Apply one keyword at the current step
    pub fn apply(&mut self, keyword: &DeckKeyword) -> ScheduleResult<()> {
        debug!(keyword = keyword.name(), step = self.current_step(), "Applying keyword");
        let result = match keyword {
            DeckKeyword::Dates { dates } => self.handle_dates(dates),
            DeckKeyword::Tstep { days } => self.handle_tstep(days),

            DeckKeyword::Welspecs { records } => each(records, |r| self.handle_welspecs(r)),
            DeckKeyword::Wconprod { records } => each(records, |r| self.handle_wconprod(r)),
            DeckKeyword::Wconhist { records } => each(records, |r| self.handle_wconhist(r)),
            DeckKeyword::Wconinje { records } => each(records, |r| self.handle_wconinje(r)),
            DeckKeyword::Wconinjh { records } => each(records, |r| self.handle_wconinjh(r)),
            DeckKeyword::Whistctl(record) => self.handle_whistctl(record),
            DeckKeyword::Welopen { records } => each(records, |r| self.handle_welopen(r)),
            DeckKeyword::Weltarg { records } => each(records, |r| self.handle_weltarg(r)),
            DeckKeyword::Wefac { records } => each(records, |r| self.handle_wefac(r)),
            DeckKeyword::Wlist { records } => each(records, |r| self.handle_wlist(r)),
            DeckKeyword::Wgrupcon { records } => each(records, |r| self.handle_wgrupcon(r)),
            DeckKeyword::Wpolymer { records } => each(records, |r| self.handle_wpolymer(r)),
            DeckKeyword::Wsolvent { records } => each(records, |r| self.handle_wsolvent(r)),
            DeckKeyword::Wtracer { records } => each(records, |r| self.handle_wtracer(r)),
            DeckKeyword::Wfoam { records } => each(records, |r| self.handle_wfoam(r)),
            DeckKeyword::Wtemp { records } => each(records, |r| self.handle_wtemp(r)),
            DeckKeyword::Wtest { records } => each(records, |r| self.handle_wtest(r)),

            DeckKeyword::Compdat { records } => each(records, |r| self.handle_compdat(r)),
            DeckKeyword::Complump { records } => each(records, |r| self.handle_complump(r)),

            DeckKeyword::Gruptree { records } => each(records, |r| self.handle_gruptree(r)),
            DeckKeyword::Gconprod { records } => each(records, |r| self.handle_gconprod(r)),
            DeckKeyword::Gconinje { records } => each(records, |r| self.handle_gconinje(r)),
            DeckKeyword::Gefac { records } => each(records, |r| self.handle_gefac(r)),

            DeckKeyword::Wrft { records } => self.handle_wrft(records),
            DeckKeyword::Wrftplt { records } => each(records, |r| self.handle_wrftplt(r)),
            DeckKeyword::Rptrst(record) => self.handle_rptrst(record),
            DeckKeyword::Rptsched(record) => self.handle_rptsched(record),

            DeckKeyword::Vfpprod(record) => self.handle_vfp(super::vfp::VfpKind::Production, record),
            DeckKeyword::Vfpinj(record) => self.handle_vfp(super::vfp::VfpKind::Injection, record),

            DeckKeyword::Drsdt(record) => self.handle_drsdt(record),
            DeckKeyword::Drvdt(record) => self.handle_drvdt(record),
            DeckKeyword::Vappars(record) => self.handle_vappars(record),
            DeckKeyword::Tuning(record) => self.handle_tuning(record),
        };

        if let Err(ref e) = result {
            warn!(keyword = keyword.name(), step = self.current_step(), error = %e, "Keyword rejected");
        }
        result
    }

    /// Freeze the accumulated state into a read-only schedule
    pub fn finish(self) -> Schedule {
        Schedule::from_builder(self)
    }

    // ========================================================================
    // Time advance
    // ========================================================================

    fn handle_dates(&mut self, dates: &[NaiveDateTime]) -> ScheduleResult<()> {
        for date in dates {
            let step = self.time_map.add_date(*date)?;
            debug!(step, date = %date, "Report step opened");
        }
        Ok(())
    }

    fn handle_tstep(&mut self, days: &[f64]) -> ScheduleResult<()> {
        for d in days {
            let step = self.time_map.add_days(*d)?;
            debug!(step, days = d, "Report step opened");
        }
        Ok(())
    }

    // ========================================================================
    // Name resolution
    // ========================================================================

    pub(crate) fn well_id(&self, name: &str) -> ScheduleResult<WellId> {
        self.well_index
            .get(name.trim())
            .copied()
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Well, name.trim()))
    }

    pub(crate) fn group_id(&self, name: &str) -> ScheduleResult<GroupId> {
        self.group_index
            .get(name.trim())
            .copied()
            .ok_or_else(|| ScheduleError::unknown(EntityKind::Group, name.trim()))
    }

    /// Resolve a well reference of a record.
    ///
    /// A `*`-prefixed name that is a defined well list expands to its members.
    /// A glob may match nothing; an exact name must exist.
    pub(crate) fn resolve_wells(&self, pattern: &str) -> ScheduleResult<Vec<WellId>> {
        let pattern = pattern.trim();
        if let Some(members) = self.well_lists.current().get(pattern) {
            return members.iter().map(|name| self.well_id(name)).collect();
        }
        match NamePattern::parse(pattern)? {
            NamePattern::Exact(name) => Ok(vec![self.well_id(&name)?]),
            glob => Ok(self
                .wells
                .iter()
                .enumerate()
                .filter(|(_, w)| glob.matches(&w.name))
                .map(|(idx, _)| WellId(idx))
                .collect()),
        }
    }

    pub(crate) fn resolve_groups(&self, pattern: &str) -> ScheduleResult<Vec<GroupId>> {
        match NamePattern::parse(pattern)? {
            NamePattern::Exact(name) => Ok(vec![self.group_id(&name)?]),
            glob => Ok(self
                .groups
                .iter()
                .enumerate()
                .filter(|(_, g)| glob.matches(&g.name))
                .map(|(idx, _)| GroupId(idx))
                .collect()),
        }
    }

    // ========================================================================
    // Leniency
    // ========================================================================

    pub(crate) fn lenient(
        &self,
        action: LeniencyAction,
        keyword: &str,
        message: String,
    ) -> ScheduleResult<()> {
        match action {
            LeniencyAction::Error => Err(ScheduleError::invalid(message)),
            LeniencyAction::Warn => {
                warn!(keyword, step = self.current_step(), "{message}");
                Ok(())
            }
            LeniencyAction::Ignore => Ok(()),
        }
    }

    /// Well and group names may not contain whitespace
    pub(crate) fn check_entity_name(
        &self,
        keyword: &str,
        kind: EntityKind,
        name: &str,
    ) -> ScheduleResult<()> {
        if name.is_empty() {
            return Err(ScheduleError::malformed(keyword, format!("{kind} name is missing")));
        }
        if name.chars().any(char::is_whitespace) {
            return self.lenient(
                self.config.parse.wgname_space,
                keyword,
                format!("{kind} name '{name}' contains whitespace"),
            );
        }
        Ok(())
    }
}

/// Apply a handler to each record in order
fn each<R, F>(records: &[R], mut handler: F) -> ScheduleResult<()>
where
    F: FnMut(&R) -> ScheduleResult<()>,
{
    records.iter().try_for_each(|r| handler(r))
}

// ============================================================================
// Item helpers
// ============================================================================

/// Parse an enumerated item, using `default` when the item is defaulted
pub(crate) fn parse_item<T>(
    keyword: &str,
    item: &str,
    value: Option<&str>,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> ScheduleResult<T> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => parse(s).ok_or_else(|| {
            ScheduleError::malformed(keyword, format!("invalid {item} '{s}'"))
        }),
    }
}

/// Parse a required enumerated item
pub(crate) fn parse_required<T>(
    keyword: &str,
    item: &str,
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> ScheduleResult<T> {
    match value.map(str::trim) {
        None | Some("") => Err(ScheduleError::malformed(keyword, format!("{item} is required"))),
        Some(s) => parse(s).ok_or_else(|| {
            ScheduleError::malformed(keyword, format!("invalid {item} '{s}'"))
        }),
    }
}

/// A finite, non-negative quantity or defaulted
pub(crate) fn non_negative(keyword: &str, item: &str, value: Option<f64>) -> ScheduleResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ScheduleError::malformed(
            keyword,
            format!("{item} must be a finite non-negative number, got {v}"),
        )),
        other => Ok(other),
    }
}

/// `YES`/`NO` flag
pub(crate) fn parse_yes_no(s: &str) -> Option<bool> {
    match s.trim().to_uppercase().as_str() {
        "YES" | "Y" => Some(true),
        "NO" | "N" => Some(false),
        _ => None,
    }
}
