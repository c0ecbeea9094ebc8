use anyhow::{Context, Result};
use chrono::Local;
use std::fs::File;
use std::path::{Path, PathBuf};

use larder_core::interchange::{
    export_history, export_products, history_export_filename, import_history, import_products,
};
use larder_core::store::Store;

pub(crate) fn cmd_import_inventory(store: &mut Store, file: &Path, json: bool) -> Result<()> {
    let input =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let products = import_products(input)?;
    let count = store.append_inventory(products)?;

    if json {
        println!("{}", serde_json::json!({ "imported": count }));
        return Ok(());
    }

    println!("Imported {count} products from {}", file.display());
    Ok(())
}

pub(crate) fn cmd_import_history(store: &mut Store, file: &Path, json: bool) -> Result<()> {
    let input =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let import = import_history(input)?;
    let count = import.entries.len();

    store.replace_history(import.entries)?;
    let pruned = store.prune_history(Local::now().date_naive())?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "imported": count,
                "has_nutrition": import.has_nutrition,
                "pruned": pruned,
            })
        );
        return Ok(());
    }

    println!("Imported {count} history entries from {}", file.display());
    if !import.has_nutrition {
        eprintln!("Note: file had no nutrient columns; entries imported with zero nutrition");
    }
    if pruned > 0 {
        eprintln!("Note: {pruned} entries were older than the retention window and dropped");
    }
    Ok(())
}

pub(crate) fn cmd_export_inventory(
    store: &Store,
    file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let path = file.unwrap_or_else(|| PathBuf::from("inventory.csv"));
    let output =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    export_products(store.products(), output)?;
    let count = store.products().len();

    if json {
        println!(
            "{}",
            serde_json::json!({ "exported": count, "path": path.display().to_string() })
        );
        return Ok(());
    }

    println!("Exported {count} products to {}", path.display());
    Ok(())
}

pub(crate) fn cmd_export_history(store: &Store, file: Option<PathBuf>, json: bool) -> Result<()> {
    let path = file
        .unwrap_or_else(|| PathBuf::from(history_export_filename(Local::now().date_naive())));
    let output =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    export_history(store.history(), output)?;
    let count = store.history().len();

    if json {
        println!(
            "{}",
            serde_json::json!({ "exported": count, "path": path.display().to_string() })
        );
        return Ok(());
    }

    println!("Exported {count} history entries to {}", path.display());
    Ok(())
}
