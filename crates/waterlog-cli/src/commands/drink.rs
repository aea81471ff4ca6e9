use chrono::{Local, NaiveDate};
use clap::Subcommand;
use waterlog_core::{Database, DrinkCatalog, DrinkEntry, MetadataLookup};

#[derive(Subcommand)]
pub enum DrinkAction {
    /// Log a drink
    Add {
        /// Volume in milliliters
        amount: u32,
        /// Drink kind (see `drink kinds`)
        #[arg(default_value = "water")]
        kind: String,
    },
    /// List entries for a day
    List {
        /// Day to list (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Delete an entry by id
    Delete { id: i64 },
    /// List known drink kinds
    Kinds,
}

pub fn run(action: DrinkAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        DrinkAction::Add { amount, kind } => {
            let entry = DrinkEntry::new(amount, kind, Local::now().naive_local())?;
            let id = db.record_drink(&entry)?;
            let payload = serde_json::json!({
                "id": id,
                "kind": entry.kind,
                "amount_ml": entry.amount_ml,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        DrinkAction::List { day } => {
            let day = day.unwrap_or_else(|| Local::now().date_naive());
            let drinks = db.drinks_for_day(day)?;
            println!("{}", serde_json::to_string_pretty(&drinks)?);
        }
        DrinkAction::Delete { id } => {
            if db.delete_drink(id)? {
                println!("deleted");
            } else {
                eprintln!("no such entry: {id}");
                std::process::exit(1);
            }
        }
        DrinkAction::Kinds => {
            let catalog = DrinkCatalog::builtin();
            let rows: Vec<serde_json::Value> = catalog
                .kind_names()
                .into_iter()
                .map(|name| {
                    let meta = catalog.lookup(name);
                    serde_json::json!({
                        "kind": name,
                        "multiplier": meta.multiplier,
                        "caffeine": meta.caffeine,
                        "alcohol": meta.alcohol,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}
