//! Integration test: a logged day flowing from storage into the calculator.

use chrono::{NaiveDate, NaiveDateTime};
use waterlog_core::{
    compute_totals, goal_reached, Config, Database, DehydrationPolicy, DrinkCatalog, DrinkEntry,
};

fn dt(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 4)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

#[test]
fn a_logged_day_rolls_up_into_net_hydration() {
    let db = Database::open_memory().unwrap();
    let catalog = DrinkCatalog::builtin();
    let policy = DehydrationPolicy::default();

    for (amount, kind, at) in [
        (300u32, "water", dt(8, 15)),
        (200, "coffee", dt(9, 0)),
        (500, "water", dt(12, 30)),
        (330, "beer", dt(19, 45)),
    ] {
        db.record_drink(&DrinkEntry::new(amount, kind, at).unwrap())
            .unwrap();
    }

    let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let entries: Vec<DrinkEntry> = db
        .drinks_for_day(day)
        .unwrap()
        .into_iter()
        .map(DrinkEntry::from)
        .collect();
    assert_eq!(entries.len(), 4);

    let totals = compute_totals(&entries, &catalog, &policy);
    assert_eq!(totals.total_actual_ml, 1330);
    // 300 + 200*0.95 + 500 + 330*0.7 = 1221
    assert!((totals.total_effective_ml - 1221.0).abs() < 1e-9);
    // 200*0.05 + 330*0.15 = 59.5
    assert!((totals.total_dehydration_ml - 59.5).abs() < 1e-9);
    assert!((totals.net_hydration_ml - 1161.5).abs() < 1e-9);

    let cfg = Config::default();
    assert!(!goal_reached(&totals, cfg.goal.daily_ml, cfg.goal.threshold));
    assert!(goal_reached(&totals, 1000, cfg.goal.threshold));
}

#[test]
fn deleting_an_entry_updates_the_day() {
    let db = Database::open_memory().unwrap();
    let catalog = DrinkCatalog::builtin();

    let keep = db
        .record_drink(&DrinkEntry::new(500, "water", dt(8, 0)).unwrap())
        .unwrap();
    let drop = db
        .record_drink(&DrinkEntry::new(400, "wine", dt(20, 0)).unwrap())
        .unwrap();
    assert_ne!(keep, drop);
    assert!(db.delete_drink(drop).unwrap());

    let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let entries: Vec<DrinkEntry> = db
        .drinks_for_day(day)
        .unwrap()
        .into_iter()
        .map(DrinkEntry::from)
        .collect();
    let totals = compute_totals(&entries, &catalog, &DehydrationPolicy::default());
    assert_eq!(totals.total_actual_ml, 500);
    assert!((totals.total_dehydration_ml - 0.0).abs() < 1e-9);
}
