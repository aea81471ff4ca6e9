//! SQLite-based drink log, pending alarms, and key-value state.
//!
//! Provides persistent storage for:
//! - Logged drink entries
//! - Pending one-shot alarms (the host's stand-in for a platform alarm
//!   service; a scheduled wakeup drains the due rows)
//! - Key-value store for the schedule memoization cache and snooze slot

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::drink::DrinkEntry;
use crate::error::DatabaseError;
use crate::reminder::{AlarmSink, AlarmTag, KvStore, ScheduleOutcome};

use super::data_dir;

const TIMESTAMP_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// A logged drink, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkRecord {
    pub id: i64,
    pub kind: String,
    pub amount_ml: u32,
    pub logged_at: NaiveDateTime,
}

impl From<DrinkRecord> for DrinkEntry {
    fn from(record: DrinkRecord) -> Self {
        DrinkEntry {
            amount_ml: record.amount_ml,
            kind: record.kind,
            logged_at: record.logged_at,
        }
    }
}

/// Raw logging statistics. Hydration math lives in [`crate::hydration`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_entries: u64,
    pub total_ml: u64,
    pub days_tracked: u64,
    pub today_entries: u64,
    pub today_ml: u64,
}

/// A one-shot alarm waiting to fire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAlarm {
    pub tag_id: i64,
    pub fire_at: NaiveDateTime,
    pub exact: bool,
}

/// SQLite database at `~/.config/waterlog/waterlog.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database, creating the file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::OpenFailed {
            path: "~/.config/waterlog".into(),
            message: e.to_string(),
        })?;
        Self::open_at(dir.join("waterlog.db"))
    }

    /// Open a database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl Into<std::path::PathBuf>) -> Result<Self, DatabaseError> {
        let path = path.into();
        let conn = Connection::open(&path).map_err(|e| DatabaseError::OpenFailed {
            path,
            message: e.to_string(),
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests, dry runs).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            message: e.to_string(),
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS drinks (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                kind      TEXT NOT NULL,
                amount_ml INTEGER NOT NULL,
                logged_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS alarms (
                tag     INTEGER PRIMARY KEY,
                fire_at TEXT NOT NULL,
                exact   INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_drinks_logged_at ON drinks(logged_at);
            CREATE INDEX IF NOT EXISTS idx_alarms_fire_at ON alarms(fire_at);",
        )?;
        Ok(())
    }

    // ── Drinks ───────────────────────────────────────────────────────

    /// Record a drink entry. Returns the new row id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_drink(&self, entry: &DrinkEntry) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO drinks (kind, amount_ml, logged_at) VALUES (?1, ?2, ?3)",
            params![
                entry.kind,
                i64::from(entry.amount_ml),
                entry.logged_at.format(TIMESTAMP_FMT).to_string(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Entries with `start <= logged_at < end`, oldest first.
    pub fn drinks_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DrinkRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, amount_ml, logged_at FROM drinks
             WHERE logged_at >= ?1 AND logged_at < ?2
             ORDER BY logged_at",
        )?;
        let rows = stmt.query_map(
            params![
                start.format(TIMESTAMP_FMT).to_string(),
                end.format(TIMESTAMP_FMT).to_string(),
            ],
            Self::row_to_drink,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// All entries logged on `day`.
    pub fn drinks_for_day(&self, day: NaiveDate) -> Result<Vec<DrinkRecord>, DatabaseError> {
        let start = day.and_time(NaiveTime::MIN);
        let end = day
            .succ_opt()
            .unwrap_or(day)
            .and_time(NaiveTime::MIN);
        self.drinks_between(start, end)
    }

    /// Delete an entry by id. Returns whether a row was removed.
    pub fn delete_drink(&self, id: i64) -> Result<bool, DatabaseError> {
        let affected = self
            .conn
            .execute("DELETE FROM drinks WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    fn row_to_drink(row: &rusqlite::Row<'_>) -> rusqlite::Result<DrinkRecord> {
        let raw: String = row.get(3)?;
        let logged_at = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FMT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let amount: i64 = row.get(2)?;
        Ok(DrinkRecord {
            id: row.get(0)?,
            kind: row.get(1)?,
            amount_ml: amount.max(0) as u32,
            logged_at,
        })
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub fn stats_today(&self, today: NaiveDate) -> Result<Stats, DatabaseError> {
        let (entries, ml) = self.day_totals(today)?;
        Ok(Stats {
            total_entries: entries,
            total_ml: ml,
            days_tracked: u64::from(entries > 0),
            today_entries: entries,
            today_ml: ml,
        })
    }

    pub fn stats_all(&self, today: NaiveDate) -> Result<Stats, DatabaseError> {
        let (total_entries, total_ml, days_tracked) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(amount_ml), 0),
                    COUNT(DISTINCT substr(logged_at, 1, 10))
             FROM drinks",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;
        let (today_entries, today_ml) = self.day_totals(today)?;
        Ok(Stats {
            total_entries: total_entries.max(0) as u64,
            total_ml: total_ml.max(0) as u64,
            days_tracked: days_tracked.max(0) as u64,
            today_entries,
            today_ml,
        })
    }

    fn day_totals(&self, day: NaiveDate) -> Result<(u64, u64), DatabaseError> {
        let start = day.and_time(NaiveTime::MIN);
        let end = day.succ_opt().unwrap_or(day).and_time(NaiveTime::MIN);
        let (entries, ml) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(amount_ml), 0) FROM drinks
             WHERE logged_at >= ?1 AND logged_at < ?2",
            params![
                start.format(TIMESTAMP_FMT).to_string(),
                end.format(TIMESTAMP_FMT).to_string(),
            ],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok((entries.max(0) as u64, ml.max(0) as u64))
    }

    // ── Alarms ───────────────────────────────────────────────────────

    /// Arm (or re-arm) a one-shot alarm slot.
    pub fn set_alarm(
        &self,
        tag_id: i64,
        fire_at: NaiveDateTime,
        exact: bool,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO alarms (tag, fire_at, exact) VALUES (?1, ?2, ?3)",
            params![tag_id, fire_at.format(TIMESTAMP_FMT).to_string(), exact],
        )?;
        Ok(())
    }

    /// Disarm an alarm slot. Clearing an empty slot is a no-op.
    pub fn clear_alarm(&self, tag_id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM alarms WHERE tag = ?1", params![tag_id])?;
        Ok(())
    }

    /// Every armed alarm, soonest first.
    pub fn pending_alarms(&self) -> Result<Vec<PendingAlarm>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag, fire_at, exact FROM alarms ORDER BY fire_at")?;
        let rows = stmt.query_map([], Self::row_to_alarm)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Remove and return every alarm due at or before `now`, soonest first.
    pub fn take_due_alarms(&self, now: NaiveDateTime) -> Result<Vec<PendingAlarm>, DatabaseError> {
        let cutoff = now.format(TIMESTAMP_FMT).to_string();
        let mut stmt = self.conn.prepare(
            "SELECT tag, fire_at, exact FROM alarms WHERE fire_at <= ?1 ORDER BY fire_at",
        )?;
        let rows = stmt.query_map(params![cutoff], Self::row_to_alarm)?;
        let mut due = Vec::new();
        for row in rows {
            due.push(row?);
        }
        self.conn
            .execute("DELETE FROM alarms WHERE fire_at <= ?1", params![cutoff])?;
        Ok(due)
    }

    fn row_to_alarm(row: &rusqlite::Row<'_>) -> rusqlite::Result<PendingAlarm> {
        let raw: String = row.get(1)?;
        let fire_at = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FMT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(PendingAlarm {
            tag_id: row.get(0)?,
            fire_at,
            exact: row.get(2)?,
        })
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        self.kv_get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.kv_set(key, value)
    }
    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.kv_remove(key)
    }
}

/// This host grants exact scheduling unconditionally; `Denied` is reserved
/// for platforms that gate it behind a permission. Storage failures are
/// logged and absorbed -- the next scheduling pass repairs the slot.
impl AlarmSink for Database {
    fn schedule_exact(&self, at: NaiveDateTime, tag: AlarmTag) -> ScheduleOutcome {
        if let Err(e) = self.set_alarm(tag.id(), at, true) {
            warn!(?tag, "failed to persist alarm: {e}");
        }
        ScheduleOutcome::Scheduled
    }

    fn schedule_inexact(&self, at: NaiveDateTime, tag: AlarmTag) {
        if let Err(e) = self.set_alarm(tag.id(), at, false) {
            warn!(?tag, "failed to persist inexact alarm: {e}");
        }
    }

    fn cancel(&self, tag: AlarmTag) {
        if let Err(e) = self.clear_alarm(tag.id()) {
            warn!(?tag, "failed to clear alarm: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn entry(amount_ml: u32, kind: &str, at: NaiveDateTime) -> DrinkEntry {
        DrinkEntry::new(amount_ml, kind, at).unwrap()
    }

    #[test]
    fn record_and_query_by_day() {
        let db = Database::open_memory().unwrap();
        db.record_drink(&entry(250, "water", dt(4, 9, 0))).unwrap();
        db.record_drink(&entry(200, "coffee", dt(4, 10, 30))).unwrap();
        db.record_drink(&entry(300, "water", dt(5, 8, 0))).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let drinks = db.drinks_for_day(day).unwrap();
        assert_eq!(drinks.len(), 2);
        assert_eq!(drinks[0].kind, "water");
        assert_eq!(drinks[1].amount_ml, 200);
    }

    #[test]
    fn delete_drink_reports_whether_removed() {
        let db = Database::open_memory().unwrap();
        let id = db.record_drink(&entry(250, "water", dt(4, 9, 0))).unwrap();
        assert!(db.delete_drink(id).unwrap());
        assert!(!db.delete_drink(id).unwrap());
    }

    #[test]
    fn stats_split_today_from_all_time() {
        let db = Database::open_memory().unwrap();
        db.record_drink(&entry(500, "water", dt(3, 12, 0))).unwrap();
        db.record_drink(&entry(250, "water", dt(4, 9, 0))).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let stats = db.stats_all(today).unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_ml, 750);
        assert_eq!(stats.days_tracked, 2);
        assert_eq!(stats.today_entries, 1);
        assert_eq!(stats.today_ml, 250);
    }

    #[test]
    fn kv_store_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_remove("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn rearming_a_tag_replaces_it() {
        let db = Database::open_memory().unwrap();
        db.set_alarm(1004, dt(4, 16, 0), true).unwrap();
        db.set_alarm(1004, dt(4, 17, 0), true).unwrap();
        let pending = db.pending_alarms().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].fire_at, dt(4, 17, 0));
    }

    #[test]
    fn due_alarms_are_drained_in_order() {
        let db = Database::open_memory().unwrap();
        db.set_alarm(1005, dt(4, 18, 0), true).unwrap();
        db.set_alarm(1004, dt(4, 16, 0), true).unwrap();
        db.set_alarm(3000, dt(4, 16, 30), false).unwrap();

        let due = db.take_due_alarms(dt(4, 17, 0)).unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].tag_id, 1004);
        assert_eq!(due[1].tag_id, 3000);
        assert!(!due[1].exact);

        let pending = db.pending_alarms().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].tag_id, 1005);
    }
}
