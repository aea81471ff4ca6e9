use chrono::Local;
use clap::Subcommand;
use waterlog_core::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's logging stats
    Today,
    /// All-time logging stats
    All,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let today = Local::now().date_naive();

    let stats = match action {
        StatsAction::Today => db.stats_today(today)?,
        StatsAction::All => db.stats_all(today)?,
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
