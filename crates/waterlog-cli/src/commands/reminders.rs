//! Reminder scheduling commands.
//!
//! `dispatch` is the host's scheduled-wakeup entry point: it drains due
//! alarms, emits a notification for each (unless the daily goal is already
//! met), and re-chains the schedule. `fired` simulates a single platform
//! callback; `restore` is the boot hook.

use chrono::{NaiveDateTime, NaiveTime};
use clap::Subcommand;
use tracing::{info, warn};
use waterlog_core::{
    compute_totals, goal_reached, AlarmTag, Config, CustomReminder, Database, DehydrationPolicy,
    DrinkCatalog, DrinkEntry, ReminderScheduler, Weekday,
};

const SMART_LABEL: &str = "Time to drink water";

#[derive(Subcommand)]
pub enum RemindersAction {
    /// Recompute and schedule reminders from current settings
    Schedule,
    /// List pending alarms
    List,
    /// Fire due alarms and re-chain
    Dispatch,
    /// Handle a fired smart reminder (platform callback)
    Fired {
        /// Index of the reminder that fired
        index: usize,
    },
    /// Defer a dismissed reminder by the configured snooze delay
    Snooze,
    /// Restore alarms after a reboot
    Restore,
    /// Cancel every scheduled alarm
    Cancel,
    /// Manage custom reminders
    Custom {
        #[command(subcommand)]
        action: CustomAction,
    },
}

#[derive(Subcommand)]
pub enum CustomAction {
    /// Add a custom reminder
    Add {
        /// Time of day (HH:MM or HH:MM:SS)
        #[arg(value_parser = parse_time)]
        time: NaiveTime,
        /// Label shown with the notification
        #[arg(default_value = "Time to drink water")]
        label: String,
        /// Active weekdays, comma separated (defaults to every day)
        #[arg(long, value_delimiter = ',')]
        days: Vec<Weekday>,
    },
    /// List custom reminders
    List,
    /// Remove a custom reminder by id
    Remove { id: String },
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| format!("invalid time '{s}': {e}"))
}

pub fn run(action: RemindersAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut cfg = Config::load_or_default();
    let now = chrono::Local::now().naive_local();
    let scheduler = ReminderScheduler::new(&db, &db);

    match action {
        RemindersAction::Schedule => {
            scheduler.schedule_notifications(&cfg, now);
            let pending = db.pending_alarms()?;
            let payload = serde_json::json!({ "pending": pending.len() });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        RemindersAction::List => {
            let rows: Vec<serde_json::Value> = db
                .pending_alarms()?
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "tag": describe_tag(a.tag_id),
                        "fire_at": a.fire_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                        "exact": a.exact,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        RemindersAction::Dispatch => {
            let due = db.take_due_alarms(now)?;
            for alarm in &due {
                match AlarmTag::from_id(alarm.tag_id) {
                    Some(AlarmTag::Smart(index)) => {
                        emit_notification(&db, &cfg, SMART_LABEL, now)?;
                        scheduler.on_reminder_fired(&cfg, index, now);
                    }
                    Some(AlarmTag::Custom(index)) => {
                        let label = cfg
                            .custom_reminders
                            .items
                            .get(index)
                            .map(|r| r.label.clone())
                            .unwrap_or_else(|| SMART_LABEL.to_string());
                        emit_notification(&db, &cfg, &label, now)?;
                        if cfg.custom_reminders.enabled {
                            // Re-arm for the next occurrence.
                            scheduler.schedule_custom_reminders(&cfg, now);
                        }
                    }
                    Some(AlarmTag::Snooze) => {
                        emit_notification(&db, &cfg, SMART_LABEL, now)?;
                        scheduler.on_snooze_fired();
                    }
                    None => warn!(tag = alarm.tag_id, "unknown alarm tag; dropping"),
                }
            }
            let payload = serde_json::json!({ "fired": due.len() });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        RemindersAction::Fired { index } => {
            emit_notification(&db, &cfg, SMART_LABEL, now)?;
            scheduler.on_reminder_fired(&cfg, index, now);
        }
        RemindersAction::Snooze => {
            scheduler.schedule_snooze(&cfg, now);
            println!("ok");
        }
        RemindersAction::Restore => {
            scheduler.restore_after_reboot(&cfg, now);
            println!("ok");
        }
        RemindersAction::Cancel => {
            scheduler.cancel_all();
            println!("ok");
        }
        RemindersAction::Custom { action } => match action {
            CustomAction::Add { time, label, days } => {
                let days = if days.is_empty() {
                    Weekday::ALL.to_vec()
                } else {
                    days
                };
                let reminder = CustomReminder::new(time, label, days);
                println!("{}", serde_json::to_string_pretty(&reminder)?);
                cfg.custom_reminders.items.push(reminder);
                cfg.save()?;
                scheduler.schedule_notifications(&cfg, now);
            }
            CustomAction::List => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&cfg.custom_reminders.items)?
                );
            }
            CustomAction::Remove { id } => {
                if cfg.remove_custom_reminder(&id) {
                    cfg.save()?;
                    scheduler.schedule_notifications(&cfg, now);
                    println!("removed");
                } else {
                    eprintln!("no such reminder: {id}");
                    std::process::exit(1);
                }
            }
        },
    }
    Ok(())
}

/// Emit a reminder notification, unless the daily goal is already met.
fn emit_notification(
    db: &Database,
    cfg: &Config,
    label: &str,
    now: NaiveDateTime,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<DrinkEntry> = db
        .drinks_for_day(now.date())?
        .into_iter()
        .map(DrinkEntry::from)
        .collect();
    let catalog = DrinkCatalog::builtin();
    let totals = compute_totals(&entries, &catalog, &DehydrationPolicy::default());
    if goal_reached(&totals, cfg.goal.daily_ml, cfg.goal.threshold) {
        info!("daily goal already met; suppressing reminder");
        return Ok(());
    }

    let mut payload = serde_json::json!({ "type": "reminder", "label": label });
    if cfg.notifications.show_progress {
        payload["net_hydration_ml"] = serde_json::json!(totals.net_hydration_ml.round());
        payload["goal_ml"] = serde_json::json!(cfg.goal.daily_ml);
    }
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn describe_tag(tag_id: i64) -> String {
    match AlarmTag::from_id(tag_id) {
        Some(AlarmTag::Smart(index)) => format!("smart[{index}]"),
        Some(AlarmTag::Custom(index)) => format!("custom[{index}]"),
        Some(AlarmTag::Snooze) => "snooze".to_string(),
        None => format!("unknown({tag_id})"),
    }
}
