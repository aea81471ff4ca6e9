//! Reminder scheduling.
//!
//! Translates notification settings into one-shot wakeups on an
//! [`AlarmSink`]. There is no resident timer loop: every fired alarm
//! re-derives the day's sequence and schedules its successor, so the chain
//! perpetuates itself through the host's one-shot alarm mechanism alone.
//!
//! Alarms carry no live handle. Identity is an [`AlarmTag`] mapped to a
//! stable integer id; cancellation reconstructs the same identities.

mod scheduler;
mod times;

pub use scheduler::{settings_hash, ReminderScheduler};
pub use times::{daily_reminder_times, next_active_day, Weekday};

use chrono::NaiveDateTime;

use crate::error::DatabaseError;

/// Slot capacity for the smart-reminder index range.
pub const SMART_SLOTS: usize = 288;
/// Slot capacity for the custom-reminder index range.
pub const CUSTOM_SLOTS: usize = 64;

const SMART_BASE: i64 = 1_000;
const CUSTOM_BASE: i64 = 2_000;
const SNOOZE_ID: i64 = 3_000;

/// Identity of a scheduled alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmTag {
    /// Interval-generated reminder, tagged by its index in the day sequence.
    Smart(usize),
    /// User-defined reminder, tagged by its position in the settings list.
    Custom(usize),
    /// The single snooze slot.
    Snooze,
}

impl AlarmTag {
    /// Stable integer identity. The ranges are disjoint so a cancel pass can
    /// reconstruct every possible tag without holding a handle.
    pub fn id(self) -> i64 {
        match self {
            AlarmTag::Smart(index) => SMART_BASE + (index.min(SMART_SLOTS - 1)) as i64,
            AlarmTag::Custom(index) => CUSTOM_BASE + (index.min(CUSTOM_SLOTS - 1)) as i64,
            AlarmTag::Snooze => SNOOZE_ID,
        }
    }

    pub fn from_id(id: i64) -> Option<AlarmTag> {
        match id {
            SNOOZE_ID => Some(AlarmTag::Snooze),
            _ if (SMART_BASE..SMART_BASE + SMART_SLOTS as i64).contains(&id) => {
                Some(AlarmTag::Smart((id - SMART_BASE) as usize))
            }
            _ if (CUSTOM_BASE..CUSTOM_BASE + CUSTOM_SLOTS as i64).contains(&id) => {
                Some(AlarmTag::Custom((id - CUSTOM_BASE) as usize))
            }
            _ => None,
        }
    }
}

/// Result of an exact-alarm request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled,
    /// The platform refused exact scheduling (missing permission). Callers
    /// degrade to an inexact request instead of failing.
    Denied,
}

/// One-shot wakeup sink -- the platform alarm seam.
///
/// Scheduling the same tag twice replaces the earlier request.
pub trait AlarmSink {
    /// Request an exact wakeup at `at`.
    fn schedule_exact(&self, at: NaiveDateTime, tag: AlarmTag) -> ScheduleOutcome;
    /// Best-effort wakeup near `at`.
    fn schedule_inexact(&self, at: NaiveDateTime, tag: AlarmTag);
    fn cancel(&self, tag: AlarmTag);
}

/// Persistent key-value seam backing the schedule memoization cache and the
/// pending-snooze timestamp. Must survive process restart.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
    fn remove(&self, key: &str) -> Result<(), DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_ids_round_trip() {
        for tag in [AlarmTag::Smart(0), AlarmTag::Smart(42), AlarmTag::Custom(7), AlarmTag::Snooze] {
            assert_eq!(AlarmTag::from_id(tag.id()), Some(tag));
        }
    }

    #[test]
    fn tag_ranges_are_disjoint() {
        assert_ne!(AlarmTag::Smart(0).id(), AlarmTag::Custom(0).id());
        assert!(AlarmTag::Smart(SMART_SLOTS - 1).id() < AlarmTag::Custom(0).id());
        assert!(AlarmTag::Custom(CUSTOM_SLOTS - 1).id() < AlarmTag::Snooze.id());
    }

    #[test]
    fn unknown_ids_do_not_resolve() {
        assert_eq!(AlarmTag::from_id(0), None);
        assert_eq!(AlarmTag::from_id(999), None);
        assert_eq!(AlarmTag::from_id(SNOOZE_ID + 1), None);
    }
}
