mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    cmd_day, cmd_delete_entry, cmd_eat, cmd_eat_custom, cmd_export_history, cmd_export_inventory,
    cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_update, cmd_import_history,
    cmd_import_inventory, cmd_prune,
};
use crate::config::Config;
use larder_core::basket::DEFAULT_QUANTITY_G;
use larder_core::models::Nutrients;
use larder_core::store::Store;

#[derive(Parser)]
#[command(
    name = "larder",
    version,
    about = "A simple, local-first pantry and nutrition tracker",
    long_about = "\n\n  ██╗      █████╗ ██████╗ ██████╗ ███████╗██████╗
  ██║     ██╔══██╗██╔══██╗██╔══██╗██╔════╝██╔══██╗
  ██║     ███████║██████╔╝██║  ██║█████╗  ██████╔╝
  ██║     ██╔══██║██╔══██╗██║  ██║██╔══╝  ██╔══██╗
  ███████╗██║  ██║██║  ██║██████╔╝███████╗██║  ██║
  ╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝ ╚══════╝╚═╝  ╚═╝
        know what's in your kitchen.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the product inventory
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Log eaten items as "name - quantity" (e.g. "rice - 150")
    Eat {
        /// Items to log, each "name - grams"
        #[arg(required = true)]
        items: Vec<String>,
        /// Date to log for (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log an ad-hoc item not in the inventory
    EatCustom {
        /// Item name (recorded with a "(Custom)" suffix)
        name: String,
        /// Quantity in grams
        #[arg(short, long, default_value_t = DEFAULT_QUANTITY_G)]
        quantity: f64,
        /// Calories per 100g
        #[arg(long, default_value = "0")]
        calories: f64,
        /// Protein per 100g
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Fat per 100g
        #[arg(long, default_value = "0")]
        fat: f64,
        /// Carbs per 100g
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fiber per 100g
        #[arg(long, default_value = "0")]
        fiber: f64,
        /// Date to log for (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what was eaten on a date (default: today)
    Day {
        /// Date to show (YYYY-MM-DD or today/yesterday/tomorrow)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a history entry by ID
    DeleteEntry {
        /// Entry ID (full or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop history entries older than the retention window
    Prune {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import data from CSV files
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Export data to CSV files
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Add a product to the inventory
    Add {
        /// Product name
        name: String,
        /// Stock in grams
        #[arg(short, long, default_value = "0")]
        quantity: f64,
        /// Calories per 100g
        #[arg(long)]
        calories: f64,
        /// Protein per 100g
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Fat per 100g
        #[arg(long, default_value = "0")]
        fat: f64,
        /// Carbs per 100g
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fiber per 100g
        #[arg(long, default_value = "0")]
        fiber: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the inventory (in-stock products first)
    List {
        /// Filter by name substring
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a product's name, stock, or nutrient values
    Update {
        /// Product ID (full or unique prefix)
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New stock in grams
        #[arg(short, long)]
        quantity: Option<f64>,
        /// New calories per 100g
        #[arg(long)]
        calories: Option<f64>,
        /// New protein per 100g
        #[arg(long)]
        protein: Option<f64>,
        /// New fat per 100g
        #[arg(long)]
        fat: Option<f64>,
        /// New carbs per 100g
        #[arg(long)]
        carbs: Option<f64>,
        /// New fiber per 100g
        #[arg(long)]
        fiber: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a product from the inventory
    Delete {
        /// Product ID (full or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Append products from a CSV file to the inventory
    Inventory {
        /// Path to the CSV file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the history from a CSV file (Date, Product, Quantity_g required)
    History {
        /// Path to the CSV file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ExportCommands {
    /// Write the inventory as CSV
    Inventory {
        /// Output path (default: inventory.csv)
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the history as CSV
    History {
        /// Output path (default: nutrition_history_<today>.csv)
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut store = Store::open(&config.db_path)?;

    match cli.command {
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                quantity,
                calories,
                protein,
                fat,
                carbs,
                fiber,
                json,
            } => cmd_food_add(
                &mut store,
                &name,
                quantity,
                Nutrients {
                    calories,
                    protein,
                    fat,
                    carbs,
                    fiber,
                },
                json,
            ),
            FoodCommands::List { search, json } => cmd_food_list(&store, search.as_deref(), json),
            FoodCommands::Update {
                id,
                name,
                quantity,
                calories,
                protein,
                fat,
                carbs,
                fiber,
                json,
            } => cmd_food_update(
                &mut store, &id, name, quantity, calories, protein, fat, carbs, fiber, json,
            ),
            FoodCommands::Delete { id, json } => cmd_food_delete(&mut store, &id, json),
        },
        Commands::Eat { items, date, json } => cmd_eat(&mut store, &items, date, json),
        Commands::EatCustom {
            name,
            quantity,
            calories,
            protein,
            fat,
            carbs,
            fiber,
            date,
            json,
        } => cmd_eat_custom(
            &mut store,
            &name,
            quantity,
            Nutrients {
                calories,
                protein,
                fat,
                carbs,
                fiber,
            },
            date,
            json,
        ),
        Commands::Day { date, json } => cmd_day(&store, date, json),
        Commands::DeleteEntry { id, json } => cmd_delete_entry(&mut store, &id, json),
        Commands::Prune { json } => cmd_prune(&mut store, json),
        Commands::Import { command } => match command {
            ImportCommands::Inventory { file, json } => {
                cmd_import_inventory(&mut store, &file, json)
            }
            ImportCommands::History { file, json } => cmd_import_history(&mut store, &file, json),
        },
        Commands::Export { command } => match command {
            ExportCommands::Inventory { file, json } => cmd_export_inventory(&store, file, json),
            ExportCommands::History { file, json } => cmd_export_history(&store, file, json),
        },
    }
}
