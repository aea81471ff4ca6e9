//! # Waterlog Core Library
//!
//! This library provides the core business logic for Waterlog, a water-intake
//! tracker with habit-building reminders. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI binary;
//! any GUI is expected to be a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Hydration Calculator**: pure functions turning logged drinks into
//!   effective and net hydration totals
//! - **Reminder Scheduler**: derives the day's reminder times and chains
//!   one-shot alarms through an [`AlarmSink`] seam, with no resident process
//! - **Storage**: SQLite-based drink log / alarm slots and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`ReminderScheduler`]: schedules, re-chains, snoozes, and restores
//!   reminder alarms
//! - [`compute_totals`] / [`HydrationTotals`]: the net-hydration calculation
//! - [`Database`]: drink log, pending alarms, and key-value state
//! - [`Config`]: application configuration management

pub mod drink;
pub mod error;
pub mod hydration;
pub mod reminder;
pub mod storage;

pub use drink::{DrinkCatalog, DrinkEntry, DrinkMetadata, MetadataLookup};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use hydration::{
    compute_totals, dehydration_pool, distribute_penalty, goal_reached, DehydrationPolicy,
    HydrationTotals,
};
pub use reminder::{
    daily_reminder_times, AlarmSink, AlarmTag, KvStore, ReminderScheduler, ScheduleOutcome,
    Weekday,
};
pub use storage::{Config, CustomReminder, Database};
