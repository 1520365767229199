use chrono::{DateTime, Datelike, Days, NaiveTime, Utc, Weekday};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReminderError {
    #[error("invalid reminder time {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("invalid weekday mask {0:#04x}")]
    InvalidDayMask(u8),
}

/// Set of weekdays stored as a bitmask, Monday in bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Weekdays(u8);

impl Weekdays {
    const ALL_BITS: u8 = 0b0111_1111;

    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// # Errors
    ///
    /// Returns `ReminderError::InvalidDayMask` if bit 7 is set.
    pub fn from_mask(mask: u8) -> Result<Self, ReminderError> {
        if mask & !Self::ALL_BITS != 0 {
            return Err(ReminderError::InvalidDayMask(mask));
        }
        Ok(Self(mask))
    }

    #[must_use]
    pub fn mask(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= bit(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !bit(day);
    }

    /// Adds the day if absent, removes it otherwise.
    pub fn toggle(&mut self, day: Weekday) {
        self.0 ^= bit(day);
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut days = Self::empty();
        for day in iter {
            days.insert(day);
        }
        days
    }
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

/// Daily training reminder: on/off switch, time of day (UTC), and weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSchedule {
    enabled: bool,
    time: NaiveTime,
    days: Weekdays,
}

impl Default for ReminderSchedule {
    fn default() -> Self {
        Self {
            enabled: true,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            days: [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Fri]
                .into_iter()
                .collect(),
        }
    }
}

impl ReminderSchedule {
    #[must_use]
    pub fn new(enabled: bool, time: NaiveTime, days: Weekdays) -> Self {
        Self {
            enabled,
            time,
            days,
        }
    }

    /// Parses a `HH:MM` time of day.
    ///
    /// # Errors
    ///
    /// Returns `ReminderError::InvalidTime` if the text is not a valid time.
    pub fn parse_time(raw: &str) -> Result<NaiveTime, ReminderError> {
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .map_err(|_| ReminderError::InvalidTime(raw.to_owned()))
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    #[must_use]
    pub fn days(&self) -> Weekdays {
        self.days
    }

    #[must_use]
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_days(mut self, days: Weekdays) -> Self {
        self.days = days;
        self
    }

    /// First reminder strictly after `after`, or `None` when disabled or no day is selected.
    #[must_use]
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.enabled || self.days.is_empty() {
            return None;
        }
        let today = after.date_naive();
        (0..=7)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .filter(|date| self.days.contains(date.weekday()))
            .map(|date| date.and_time(self.time).and_utc())
            .find(|candidate| *candidate > after)
    }
}
