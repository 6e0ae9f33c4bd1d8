//! Rehearsal slot grid.
//!
//! A poll is configured with a set of weekdays, a daily time window and an
//! interval. The grid is the Cartesian product of those days and the time
//! labels that fit completely inside the window; the end of the window is an
//! exclusive bound and a partial trailing slot is dropped.

use std::collections::HashMap;

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::{
    errors::{PlanError, PlanResult},
    models::slot::{Day, Slot, SlotConfig, hhmm},
};

/// The slot universe of one rehearsal poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotGrid {
    days: Vec<Day>,
    times: Vec<NaiveTime>,
    day_index: [Option<usize>; 7],
    time_index: HashMap<NaiveTime, usize>,
}

/// One row of the grid: a time label across every configured day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRow {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub slots: Vec<Slot>,
}

/// Builds the slot grid for a poll configuration.
///
/// Fails with `InvalidConfig` when the interval is zero or the window is
/// empty or inverted. No days, or an interval longer than the window, yields
/// an empty grid.
pub fn generate_slots(config: &SlotConfig) -> PlanResult<SlotGrid> {
    if config.interval_minutes == 0 {
        return Err(PlanError::InvalidConfig(
            "Interval must be a positive number of minutes".to_string(),
        ));
    }
    if config.start_time >= config.end_time {
        return Err(PlanError::InvalidConfig(format!(
            "Start time {} must be before end time {}",
            config.start_time.format("%H:%M"),
            config.end_time.format("%H:%M")
        )));
    }

    let start = minutes_from_midnight(config.start_time);
    let end = minutes_from_midnight(config.end_time);
    let count = (end - start) / config.interval_minutes;

    let times: Vec<NaiveTime> = (0..count)
        .map(|i| start + i * config.interval_minutes)
        .filter_map(|minutes| NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0))
        .collect();

    Ok(SlotGrid::new(config.days.iter().copied(), times))
}

fn minutes_from_midnight(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

impl SlotGrid {
    fn new(days: impl IntoIterator<Item = Day>, times: Vec<NaiveTime>) -> Self {
        let mut days: Vec<Day> = days.into_iter().collect();
        days.sort();
        days.dedup();

        let mut day_index = [None; 7];
        for (position, day) in days.iter().enumerate() {
            day_index[day.index()] = Some(position);
        }

        let time_index = times
            .iter()
            .enumerate()
            .map(|(position, time)| (*time, position))
            .collect();

        Self {
            days,
            times,
            day_index,
            time_index,
        }
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.days.len() * self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat slot sequence, day first then time.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.days
            .iter()
            .flat_map(move |day| self.times.iter().map(move |time| Slot::new(*day, *time)))
    }

    /// Time-major rows for laying the grid out.
    pub fn rows(&self) -> Vec<SlotRow> {
        self.times
            .iter()
            .map(|time| SlotRow {
                time: *time,
                slots: self.days.iter().map(|day| Slot::new(*day, *time)).collect(),
            })
            .collect()
    }

    /// Index of `slot` in [`SlotGrid::slots`], if it belongs to the grid.
    pub fn position(&self, slot: &Slot) -> Option<usize> {
        let day = self.day_index[slot.day.index()]?;
        let time = *self.time_index.get(&slot.time)?;
        Some(day * self.times.len() + time)
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.position(slot).is_some()
    }
}
