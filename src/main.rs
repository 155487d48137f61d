// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use agroflow::config::load_config;
use agroflow::logging::{init_tracing, init_tracing_to_file, init_tracing_with_writer};
use agroflow::dashboard::summarize;
use agroflow::{
    AnimalStatus, CollectionKind, EntryType, FarmError, FarmStore, NewAnimal, NewFinancialEntry,
    NewHealthRecord, NewLaborRecord,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "agroflow", version, about = "Farm records: animals, health, finances, labor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the terminal UI (default)
    Ui,

    /// Print one collection
    List {
        /// animals | health | finances | labor
        collection: CollectionKind,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an animal to the inventory
    AddAnimal {
        name: String,
        species: String,
        #[arg(long, default_value_t = AnimalStatus::Healthy)]
        status: AnimalStatus,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record a health event
    AddHealth {
        animal_id: String,
        symptoms: String,
        #[arg(long, default_value = "")]
        treatment: String,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        cost: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record income or expense
    AddFinance {
        /// INCOME | EXPENSE
        entry_type: EntryType,
        category: String,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record hours worked; wage is an hourly rate
    AddLabor {
        worker_name: String,
        task: String,
        #[arg(allow_negative_numbers = true)]
        hours: f64,
        #[arg(allow_negative_numbers = true)]
        wage: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a record by id
    Delete {
        collection: CollectionKind,
        id: String,
    },

    /// Change an animal's status
    Status {
        id: String,
        status: AnimalStatus,
    },

    /// Print the dashboard summary
    Dashboard {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Ui);
    let config = load_config()?;

    // The terminal UI draws on the tty; anything logged there would corrupt the frame
    if matches!(command, Command::Ui) {
        if let Err(e) = init_tracing_to_file(&config.log_path()) {
            eprintln!("⚠️  Cannot open log file {}: {} (logging disabled)", config.log_path().display(), e);
            init_tracing_with_writer(std::io::sink);
        }
    } else {
        init_tracing();
    }

    let storage = config.open_storage()?;
    let mut store = FarmStore::open(storage);

    match command {
        Command::Ui => run_ui_mode(store)?,
        Command::List { collection, json } => run_list(&store, collection, json)?,
        Command::AddAnimal { name, species, status, date } => {
            let mut draft = NewAnimal::new(name, species).with_status(status);
            draft.entry_date = date;
            report_add(store.add(draft))?;
        }
        Command::AddHealth { animal_id, symptoms, treatment, cost, date } => {
            if store.data().find_animal(&animal_id).is_none() {
                println!("⚠️  No animal with id {} (recording anyway)", animal_id);
            }
            let mut draft = NewHealthRecord::new(animal_id, symptoms, cost).with_treatment(treatment);
            draft.date = date;
            report_add(store.add(draft))?;
        }
        Command::AddFinance { entry_type, category, amount, description, date } => {
            let mut draft = NewFinancialEntry::new(entry_type, category, amount).with_description(description);
            draft.date = date;
            report_add(store.add(draft))?;
        }
        Command::AddLabor { worker_name, task, hours, wage, date } => {
            let mut draft = NewLaborRecord::new(worker_name, task, hours, wage);
            draft.date = date;
            report_add(store.add(draft))?;
        }
        Command::Delete { collection, id } => {
            if store.delete_in(collection, &id)? {
                println!("✓ Deleted {} from {}", id, collection);
            } else {
                println!("✓ Nothing to delete: {} not in {}", id, collection);
            }
        }
        Command::Status { id, status } => {
            if store.set_animal_status(&id, status)? {
                println!("✓ {} is now {}", id, status);
            } else {
                println!("⚠️  No animal with id {}", id);
            }
        }
        Command::Dashboard { json } => run_dashboard(&store, json)?,
    }

    Ok(())
}

/// Validation failures are printed, not propagated: they are the user's
/// input, not a program error.
fn report_add(result: agroflow::Result<String>) -> Result<()> {
    match result {
        Ok(id) => {
            println!("✓ Added {}", id);
            Ok(())
        }
        Err(FarmError::Validation(errors)) => {
            eprintln!("❌ Rejected:");
            for error in errors {
                eprintln!("   {}", error);
            }
            std::process::exit(2);
        }
        Err(e) => Err(e).context("Failed to save farm data"),
    }
}

fn run_list(store: &FarmStore, collection: CollectionKind, json: bool) -> Result<()> {
    let data = store.data();

    if json {
        let value = match collection {
            CollectionKind::Animals => serde_json::to_string_pretty(&data.animals)?,
            CollectionKind::HealthRecords => serde_json::to_string_pretty(&data.health_records)?,
            CollectionKind::Finances => serde_json::to_string_pretty(&data.finances)?,
            CollectionKind::Labor => serde_json::to_string_pretty(&data.labor)?,
        };
        println!("{}", value);
        return Ok(());
    }

    match collection {
        CollectionKind::Animals => {
            for a in &data.animals {
                println!("{}  {:<20} {:<12} {:<10} {}", a.id, a.name, a.species, a.status, a.entry_date);
            }
        }
        CollectionKind::HealthRecords => {
            for h in &data.health_records {
                println!("{}  {}  animal={}  {:<20} {:<20} {:>10.2}", h.id, h.date, h.animal_id, h.symptoms, h.treatment, h.cost);
            }
        }
        CollectionKind::Finances => {
            for f in &data.finances {
                println!("{}  {}  {:<7} {:<16} {:>10.2}  {}", f.id, f.date, f.entry_type, f.category, f.amount, f.description);
            }
        }
        CollectionKind::Labor => {
            for l in &data.labor {
                println!("{}  {}  {:<16} {:<16} {:>5.1}h x {:>8.2} = {:>10.2}", l.id, l.date, l.worker_name, l.task, l.hours, l.wage, l.cost());
            }
        }
    }

    Ok(())
}

fn run_dashboard(store: &FarmStore, json: bool) -> Result<()> {
    let summary = summarize(store.data());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("🌾 AgroFlow Dashboard");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Animals:        {}", summary.total_animals);
    for status in AnimalStatus::ALL {
        println!("  {:<12}  {}", status, summary.status_counts.get(status));
    }
    println!();
    println!("Income:         {:>12.2}", summary.total_income);
    println!("Expense:        {:>12.2}", summary.total_expense);
    println!("Balance:        {:>12.2}", summary.balance);
    println!();
    println!("Health spend:   {:>12.2}  ({} records)", summary.health_spend, summary.health_record_count);
    if summary.orphaned_health_records > 0 {
        println!("  for removed animals: {}", summary.orphaned_health_records);
    }
    println!("Labor cost:     {:>12.2}  ({:.1} h)", summary.labor_cost, summary.labor_hours);

    if !summary.expenses_by_category.is_empty() {
        println!();
        println!("Expenses by category:");
        for category in &summary.expenses_by_category {
            println!("  {:<20} {:>12.2}  ({})", category.category, category.total, category.count);
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: FarmStore) -> Result<()> {
    let mut app = ui::App::new(store);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: FarmStore) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the subcommands: agroflow --help");
    std::process::exit(1);
}
