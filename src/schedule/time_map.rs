//! Report step timeline
//!
//! Step 0 is the deck start. Each `DATES` entry or `TSTEP` increment opens a
//! new step; boundaries are strictly increasing.

use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, Duration, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeMap {
    steps: Vec<NaiveDateTime>,
}

impl TimeMap {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { steps: vec![start] }
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn last_step(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn start(&self) -> NaiveDateTime {
        self.steps[0]
    }

    /// Open a new step at an absolute date
    pub fn add_date(&mut self, date: NaiveDateTime) -> ScheduleResult<usize> {
        let last = self.steps[self.last_step()];
        if date <= last {
            return Err(ScheduleError::invalid(format!(
                "report date {date} is not after the previous boundary {last}"
            )));
        }
        self.steps.push(date);
        Ok(self.last_step())
    }

    /// Open a new step `days` after the previous boundary
    pub fn add_days(&mut self, days: f64) -> ScheduleResult<usize> {
        if !days.is_finite() || days <= 0.0 {
            return Err(ScheduleError::invalid(format!(
                "time step length must be positive, got {days}"
            )));
        }
        // millisecond resolution is ample for report steps
        let millis = (days * 86_400_000.0).round() as i64;
        let delta = Duration::try_milliseconds(millis)
            .ok_or_else(|| ScheduleError::invalid(format!("time step of {days} days overflows")))?;
        let last = self.steps[self.last_step()];
        let next = last
            .checked_add_signed(delta)
            .ok_or_else(|| ScheduleError::invalid(format!("time step of {days} days overflows")))?;
        self.add_date(next)
    }

    fn check(&self, step: usize) -> ScheduleResult<()> {
        if step < self.steps.len() {
            Ok(())
        } else {
            Err(ScheduleError::OutOfRange {
                step,
                num_steps: self.steps.len(),
            })
        }
    }

    /// Calendar time of a step boundary
    pub fn time(&self, step: usize) -> ScheduleResult<NaiveDateTime> {
        self.check(step)?;
        Ok(self.steps[step])
    }

    /// Elapsed time from the start to a step boundary
    pub fn sim_time(&self, step: usize) -> ScheduleResult<Duration> {
        Ok(self.time(step)? - self.start())
    }

    /// Elapsed days, as used in log messages
    pub fn sim_days(&self, step: usize) -> ScheduleResult<f64> {
        Ok(self.sim_time(step)?.num_milliseconds() as f64 / 86_400_000.0)
    }

    /// Step whose interval contains `time`: the greatest boundary not after it
    pub fn step_at(&self, time: NaiveDateTime) -> Option<usize> {
        let idx = self.steps.partition_point(|t| *t <= time);
        idx.checked_sub(1)
    }

    /// Step 0 counts as the first step of its month
    pub fn is_first_step_in_month(&self, step: usize) -> ScheduleResult<bool> {
        self.check(step)?;
        if step == 0 {
            return Ok(true);
        }
        let (prev, cur) = (self.steps[step - 1], self.steps[step]);
        Ok(prev.year() != cur.year() || prev.month() != cur.month())
    }

    pub fn is_first_step_in_year(&self, step: usize) -> ScheduleResult<bool> {
        self.check(step)?;
        if step == 0 {
            return Ok(true);
        }
        Ok(self.steps[step - 1].year() != self.steps[step].year())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn dates_and_tsteps_extend_the_timeline() {
        let mut tm = TimeMap::new(date(2020, 1, 1));
        tm.add_date(date(2020, 2, 1)).expect("later date");
        tm.add_days(10.0).expect("positive step");
        assert_eq!(tm.num_steps(), 3);
        assert_eq!(tm.time(2).expect("in range"), date(2020, 2, 11));
        assert_eq!(tm.sim_days(1).expect("in range"), 31.0);
    }

    #[test]
    fn non_increasing_date_is_rejected() {
        let mut tm = TimeMap::new(date(2020, 1, 1));
        assert!(tm.add_date(date(2020, 1, 1)).is_err());
        assert!(tm.add_days(0.0).is_err());
        assert_eq!(tm.num_steps(), 1);
    }

    #[test]
    fn out_of_range_step() {
        let tm = TimeMap::new(date(2020, 1, 1));
        assert_eq!(
            tm.sim_time(3).unwrap_err(),
            ScheduleError::OutOfRange { step: 3, num_steps: 1 }
        );
    }

    #[test]
    fn first_steps_in_month_and_year() {
        let mut tm = TimeMap::new(date(2020, 11, 20));
        tm.add_date(date(2020, 11, 30)).expect("later");
        tm.add_date(date(2020, 12, 5)).expect("later");
        tm.add_date(date(2021, 1, 5)).expect("later");
        assert!(tm.is_first_step_in_month(0).expect("in range"));
        assert!(!tm.is_first_step_in_month(1).expect("in range"));
        assert!(tm.is_first_step_in_month(2).expect("in range"));
        assert!(!tm.is_first_step_in_year(2).expect("in range"));
        assert!(tm.is_first_step_in_year(3).expect("in range"));
    }

    #[test]
    fn step_at_maps_time_back_to_step() {
        let mut tm = TimeMap::new(date(2020, 1, 1));
        tm.add_date(date(2020, 3, 1)).expect("later");
        assert_eq!(tm.step_at(date(2019, 12, 31)), None);
        assert_eq!(tm.step_at(date(2020, 2, 1)), Some(0));
        assert_eq!(tm.step_at(date(2020, 3, 1)), Some(1));
    }
}
