use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{NaiveTime, ParseWeekdayError, Weekday};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::{errors::PlanError, models::task::RehearsalPollConfig};

/// Day of the week, ordered Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Day::Sunday => "Sunday",
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }

    /// Position in the canonical week, 0 for Sunday.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Day::ALL[weekday.num_days_from_sunday() as usize]
    }
}

impl From<Day> for Weekday {
    fn from(day: Day) -> Self {
        match day {
            Day::Sunday => Weekday::Sun,
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
        }
    }
}

/// Accepts full or abbreviated English names in any case.
impl FromStr for Day {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<Weekday>().map(Day::from)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a stored time of day, `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Serializes a `NaiveTime` as an `HH:MM` label.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }
}

/// A single schedulable (day, time of day) unit of a rehearsal poll.
///
/// Ordering is day first, then time, which is the canonical order of the
/// slot universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub day: Day,
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(day: Day, time: NaiveTime) -> Self {
        Self { day, time }
    }

    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// Composite key, e.g. `Monday-18:00`.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.time.format("%H:%M"))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Slot", 3)?;
        state.serialize_field("day", &self.day)?;
        state.serialize_field("time", &self.time_label())?;
        state.serialize_field("id", &self.id())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConfig {
    pub days: BTreeSet<Day>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_minutes: u32,
}

impl SlotConfig {
    pub fn new(
        days: impl IntoIterator<Item = Day>,
        start_time: NaiveTime,
        end_time: NaiveTime,
        interval_minutes: u32,
    ) -> Self {
        Self {
            days: days.into_iter().collect(),
            start_time,
            end_time,
            interval_minutes,
        }
    }
}

impl TryFrom<&RehearsalPollConfig> for SlotConfig {
    type Error = PlanError;

    fn try_from(raw: &RehearsalPollConfig) -> Result<Self, Self::Error> {
        let days = raw
            .days
            .iter()
            .map(|name| {
                name.parse::<Day>()
                    .map_err(|_| PlanError::InvalidConfig(format!("Unknown day name: {name:?}")))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        let start_time = parse_time_of_day(&raw.time_start).ok_or_else(|| {
            PlanError::InvalidConfig(format!("Invalid start time: {:?}", raw.time_start))
        })?;
        let end_time = parse_time_of_day(&raw.time_end).ok_or_else(|| {
            PlanError::InvalidConfig(format!("Invalid end time: {:?}", raw.time_end))
        })?;

        let interval_minutes = u32::try_from(raw.interval_minutes)
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| {
                PlanError::InvalidConfig(format!(
                    "Interval must be a positive number of minutes, got {}",
                    raw.interval_minutes
                ))
            })?;

        Ok(Self {
            days,
            start_time,
            end_time,
            interval_minutes,
        })
    }
}
