mod config;
pub mod database;

pub use config::{
    Config, CustomReminder, CustomRemindersConfig, GoalConfig, NotificationsConfig,
    SmartRemindersConfig,
};
pub use database::{Database, DrinkRecord, PendingAlarm, Stats};

use std::path::PathBuf;

/// Returns `~/.config/waterlog[-dev]/` based on WATERLOG_ENV.
///
/// Set WATERLOG_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WATERLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("waterlog-dev")
    } else {
        base_dir.join("waterlog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
