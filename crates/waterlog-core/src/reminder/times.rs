//! Reminder time-of-day derivation.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Day of week for reminder activation sets.
///
/// Serialized as lowercase three-letter names ("mon", "tue", ...) so config
/// files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.name() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown weekday: {s}"))
    }
}

/// Walk from `wake_up` towards `bed_time` in `interval_min` steps.
///
/// The sequence is strictly increasing, starts at `wake_up` and stops
/// (exclusive) at `bed_time`. A zero interval or an inverted window yields an
/// empty sequence; callers treat that as "no smart reminders today" rather
/// than an error.
pub fn daily_reminder_times(
    wake_up: NaiveTime,
    bed_time: NaiveTime,
    interval_min: u32,
) -> Vec<NaiveTime> {
    if interval_min == 0 || wake_up >= bed_time {
        return Vec::new();
    }
    let step = u64::from(interval_min) * 60;
    let bed_secs = u64::from(bed_time.num_seconds_from_midnight());
    let mut out = Vec::new();
    let mut secs = u64::from(wake_up.num_seconds_from_midnight());
    while secs < bed_secs {
        if let Some(t) = NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0) {
            out.push(t);
        }
        secs += step;
    }
    out
}

/// First date strictly after `from`, within `lookahead` days, whose weekday
/// is in `days`. `None` means the chain goes idle.
pub fn next_active_day(from: NaiveDate, days: &[Weekday], lookahead: u32) -> Option<NaiveDate> {
    (1..=i64::from(lookahead))
        .filter_map(|offset| from.checked_add_signed(chrono::Duration::days(offset)))
        .find(|date| days.contains(&Weekday::of(*date)))
}
