use chrono::Local;
use waterlog_core::{
    compute_totals, goal_reached, Config, Database, DehydrationPolicy, DrinkCatalog, DrinkEntry,
};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    let db = Database::open()?;
    let today = Local::now().date_naive();

    let entries: Vec<DrinkEntry> = db
        .drinks_for_day(today)?
        .into_iter()
        .map(DrinkEntry::from)
        .collect();
    let catalog = DrinkCatalog::builtin();
    let totals = compute_totals(&entries, &catalog, &DehydrationPolicy::default());
    let reached = goal_reached(&totals, cfg.goal.daily_ml, cfg.goal.threshold);
    let progress_pct = if cfg.goal.daily_ml > 0 {
        (totals.net_hydration_ml / f64::from(cfg.goal.daily_ml) * 100.0).min(100.0)
    } else {
        0.0
    };

    let payload = serde_json::json!({
        "date": today.format("%Y-%m-%d").to_string(),
        "entries": entries.len(),
        "total_actual_ml": totals.total_actual_ml,
        "total_effective_ml": totals.total_effective_ml,
        "total_dehydration_ml": totals.total_dehydration_ml,
        "net_hydration_ml": totals.net_hydration_ml,
        "goal_ml": cfg.goal.daily_ml,
        "goal_reached": reached,
        "progress_pct": progress_pct,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
