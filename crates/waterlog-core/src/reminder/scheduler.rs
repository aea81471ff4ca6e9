//! The reminder scheduler.
//!
//! All entry points take an explicit `now` so the logic stays deterministic
//! and the host decides which clock applies. Scheduling failures are absorbed
//! here: a denied exact alarm degrades to inexact, a broken cache read forces
//! at worst one redundant reschedule, and an empty reminder window simply
//! leaves the chain idle.

use chrono::{Duration, NaiveDateTime};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::storage::Config;

use super::times::{daily_reminder_times, next_active_day, Weekday};
use super::{AlarmSink, AlarmTag, KvStore, ScheduleOutcome, CUSTOM_SLOTS, SMART_SLOTS};

const KEY_SETTINGS_HASH: &str = "reminders.settings_hash";
const KEY_LAST_SCHEDULED: &str = "reminders.last_scheduled_at";
const KEY_SNOOZE_AT: &str = "reminders.snooze_at";

/// How far ahead to look for the next active weekday.
const LOOKAHEAD_DAYS: u32 = 7;

const TIMESTAMP_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// Chains one-shot hydration reminders on an [`AlarmSink`].
pub struct ReminderScheduler<'a> {
    sink: &'a dyn AlarmSink,
    cache: &'a dyn KvStore,
}

impl<'a> ReminderScheduler<'a> {
    pub fn new(sink: &'a dyn AlarmSink, cache: &'a dyn KvStore) -> Self {
        Self { sink, cache }
    }

    /// Memoized entry point: translate the current settings into alarms.
    ///
    /// The pass is skipped when the scheduling-relevant settings hash is
    /// unchanged AND the last pass already ran today. Losing the cache only
    /// costs a redundant reschedule; it can never cause a missed reminder.
    pub fn schedule_notifications(&self, cfg: &Config, now: NaiveDateTime) {
        if !cfg.notifications.enabled {
            debug!("notifications disabled; clearing all alarms");
            self.cancel_all();
            return;
        }
        let hash = settings_hash(cfg);
        if self.is_memoized(&hash, now) {
            debug!("settings unchanged since last pass today; skipping reschedule");
            return;
        }
        self.reschedule(cfg, now);
        self.remember_pass(&hash, now);
    }

    fn reschedule(&self, cfg: &Config, now: NaiveDateTime) {
        self.cancel_all();
        if cfg.smart_reminders.enabled {
            self.schedule_smart_reminders(cfg, now);
        }
        if cfg.custom_reminders.enabled {
            self.schedule_custom_reminders(cfg, now);
        }
    }

    /// Schedule every remaining interval reminder for today, or the first
    /// slot of the next active day when today is exhausted or inactive.
    pub fn schedule_smart_reminders(&self, cfg: &Config, now: NaiveDateTime) {
        let smart = &cfg.smart_reminders;
        let times = daily_reminder_times(smart.wake_up, smart.bed_time, smart.interval_min);
        if times.is_empty() {
            warn!(
                interval_min = smart.interval_min,
                "no valid reminder window; smart reminders stay idle"
            );
            return;
        }
        let today = now.date();
        let mut scheduled = 0usize;
        if smart.days.contains(&Weekday::of(today)) {
            for (index, time) in times.iter().take(SMART_SLOTS).enumerate() {
                let at = today.and_time(*time);
                if at > now {
                    self.schedule_at(at, AlarmTag::Smart(index));
                    scheduled += 1;
                }
            }
        }
        if scheduled == 0 {
            match next_active_day(today, &smart.days, LOOKAHEAD_DAYS) {
                Some(day) => self.schedule_at(day.and_time(times[0]), AlarmTag::Smart(0)),
                None => debug!("no active weekday within lookahead; smart reminders idle"),
            }
        }
    }

    /// Schedule each enabled custom reminder: today if its time is still
    /// ahead, otherwise on its next active weekday.
    pub fn schedule_custom_reminders(&self, cfg: &Config, now: NaiveDateTime) {
        let today = now.date();
        for (index, reminder) in cfg
            .custom_reminders
            .items
            .iter()
            .take(CUSTOM_SLOTS)
            .enumerate()
        {
            if !reminder.enabled {
                continue;
            }
            let today_at = today.and_time(reminder.time);
            let at = if reminder.days.contains(&Weekday::of(today)) && today_at > now {
                Some(today_at)
            } else {
                next_active_day(today, &reminder.days, LOOKAHEAD_DAYS)
                    .map(|day| day.and_time(reminder.time))
            };
            match at {
                Some(at) => self.schedule_at(at, AlarmTag::Custom(index)),
                None => debug!(reminder = %reminder.id, "no active weekday within lookahead"),
            }
        }
    }

    /// Re-chain after a smart reminder fired: schedule slot `index + 1` if it
    /// is still ahead today, otherwise the first slot of the next active day.
    pub fn on_reminder_fired(&self, cfg: &Config, index: usize, now: NaiveDateTime) {
        if !cfg.notifications.enabled || !cfg.smart_reminders.enabled {
            return;
        }
        let smart = &cfg.smart_reminders;
        let times = daily_reminder_times(smart.wake_up, smart.bed_time, smart.interval_min);
        if times.is_empty() {
            return;
        }
        let today = now.date();
        let next = index + 1;
        if next < times.len().min(SMART_SLOTS) {
            let at = today.and_time(times[next]);
            if at > now {
                self.schedule_at(at, AlarmTag::Smart(next));
                return;
            }
        }
        match next_active_day(today, &smart.days, LOOKAHEAD_DAYS) {
            Some(day) => self.schedule_at(day.and_time(times[0]), AlarmTag::Smart(0)),
            None => debug!("day exhausted and no active weekday ahead; chain idle"),
        }
    }

    /// One-shot deferred re-notification. The absolute target is persisted so
    /// a reboot can restore it.
    pub fn schedule_snooze(&self, cfg: &Config, now: NaiveDateTime) {
        if !cfg.notifications.snooze_enabled {
            debug!("snooze disabled in settings; ignoring");
            return;
        }
        let at = now + Duration::minutes(i64::from(cfg.notifications.snooze_delay_min));
        self.schedule_at(at, AlarmTag::Snooze);
        if let Err(e) = self
            .cache
            .set(KEY_SNOOZE_AT, &at.format(TIMESTAMP_FMT).to_string())
        {
            warn!("failed to persist snooze target: {e}");
        }
    }

    /// Drop the persisted snooze target once its alarm has fired.
    pub fn on_snooze_fired(&self) {
        if let Err(e) = self.cache.remove(KEY_SNOOZE_AT) {
            warn!("failed to clear snooze target: {e}");
        }
    }

    /// Rebuild alarm state after a device restart.
    ///
    /// The platform forgot every pending alarm, so the full scheduling pass
    /// runs unconditionally; a persisted snooze target still in the future is
    /// rescheduled verbatim, a stale one is cleared.
    pub fn restore_after_reboot(&self, cfg: &Config, now: NaiveDateTime) {
        if cfg.notifications.enabled {
            self.reschedule(cfg, now);
            self.remember_pass(&settings_hash(cfg), now);
        }
        // After the cancel pass above, so the restored slot survives it.
        match self.cache.get(KEY_SNOOZE_AT) {
            Ok(Some(raw)) => match NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FMT) {
                Ok(at) if at > now => self.schedule_at(at, AlarmTag::Snooze),
                _ => {
                    debug!("dropping stale snooze target");
                    if let Err(e) = self.cache.remove(KEY_SNOOZE_AT) {
                        warn!("failed to clear stale snooze target: {e}");
                    }
                }
            },
            Ok(None) => {}
            Err(e) => warn!("cache read failed during restore: {e}"),
        }
    }

    /// Cancel every alarm this scheduler could have created, by
    /// reconstructing each tag identity in turn.
    pub fn cancel_all(&self) {
        for index in 0..SMART_SLOTS {
            self.sink.cancel(AlarmTag::Smart(index));
        }
        for index in 0..CUSTOM_SLOTS {
            self.sink.cancel(AlarmTag::Custom(index));
        }
        self.sink.cancel(AlarmTag::Snooze);
    }

    fn schedule_at(&self, at: NaiveDateTime, tag: AlarmTag) {
        match self.sink.schedule_exact(at, tag) {
            ScheduleOutcome::Scheduled => {}
            ScheduleOutcome::Denied => {
                warn!(?tag, %at, "exact alarm denied; falling back to inexact");
                self.sink.schedule_inexact(at, tag);
            }
        }
    }

    fn is_memoized(&self, hash: &str, now: NaiveDateTime) -> bool {
        let stored_hash = match self.cache.get(KEY_SETTINGS_HASH) {
            Ok(v) => v,
            Err(e) => {
                warn!("cache read failed: {e}");
                return false;
            }
        };
        let stored_at = match self.cache.get(KEY_LAST_SCHEDULED) {
            Ok(v) => v,
            Err(e) => {
                warn!("cache read failed: {e}");
                return false;
            }
        };
        match (stored_hash, stored_at) {
            (Some(h), Some(at)) => {
                h == hash
                    && NaiveDateTime::parse_from_str(&at, TIMESTAMP_FMT)
                        .map(|t| t.date() == now.date())
                        .unwrap_or(false)
            }
            _ => false,
        }
    }

    fn remember_pass(&self, hash: &str, now: NaiveDateTime) {
        if let Err(e) = self.cache.set(KEY_SETTINGS_HASH, hash) {
            warn!("failed to store settings hash: {e}");
        }
        if let Err(e) = self
            .cache
            .set(KEY_LAST_SCHEDULED, &now.format(TIMESTAMP_FMT).to_string())
        {
            warn!("failed to store schedule timestamp: {e}");
        }
    }
}

/// Digest of the config sections that affect scheduling.
///
/// serde_json maps sort their keys, so the digest is stable across runs for
/// equal settings.
pub fn settings_hash(cfg: &Config) -> String {
    let scope = serde_json::json!({
        "notifications": &cfg.notifications,
        "smart": &cfg.smart_reminders,
        "custom": &cfg.custom_reminders,
    });
    let mut hasher = Sha256::new();
    hasher.update(scope.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
