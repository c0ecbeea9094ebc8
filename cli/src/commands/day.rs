use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::process;

use larder_core::models::{HistoryEntry, NutrientTotals};
use larder_core::nutrients::{MacroPercentages, format_totals, macro_percentages, per_item_contribution};
use larder_core::store::Store;

use super::helpers::{parse_date, resolve_id, short_id};

#[derive(Serialize)]
struct DayReport<'a> {
    date: String,
    entries: Vec<&'a HistoryEntry>,
    totals: NutrientTotals,
    percentages: MacroPercentages,
}

pub(crate) fn cmd_day(store: &Store, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?.format("%Y-%m-%d").to_string();
    let entries: Vec<&HistoryEntry> = store.history_for_date(&date).collect();

    let totals = larder_core::nutrients::accumulate(&entries, |e| {
        e.nutrients().map(|n| (n, e.quantity_g))
    });

    if json {
        let report = DayReport {
            date: date.clone(),
            entries,
            totals,
            percentages: macro_percentages(&totals),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("No entries for {date}");
        process::exit(2);
    }

    println!("=== {date} ===\n");
    for e in &entries {
        let id = short_id(&e.id);
        let name = &e.product;
        let quantity = e.quantity_g;
        let calories = e
            .calories_100g
            .map_or(0.0, |c| per_item_contribution(c, e.quantity_g).round());
        let protein = e
            .protein_100g
            .map_or(0.0, |p| per_item_contribution(p, e.quantity_g));
        println!("  [{id}] {name}: {quantity:.0}g, {calories:.0} kcal, {protein:.1}g protein");
    }
    println!();
    println!("  TOTAL: {}", format_totals(&totals, false, true));

    Ok(())
}

pub(crate) fn cmd_delete_entry(store: &mut Store, id: &str, json: bool) -> Result<()> {
    let id = resolve_id(store.history().iter().map(|e| e.id.as_str()), id)?;
    let entry = store
        .history()
        .iter()
        .find(|e| e.id == id)
        .map(|e| (e.product.clone(), e.date.clone()))
        .unwrap_or_default();
    store.delete_history_entry(&id)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": id, "product": entry.0, "date": entry.1 })
        );
        return Ok(());
    }

    let (product, date) = entry;
    println!("Deleted '{product}' from {date}");
    Ok(())
}

pub(crate) fn cmd_prune(store: &mut Store, json: bool) -> Result<()> {
    let removed = store.prune_history(Local::now().date_naive())?;

    if json {
        println!("{}", serde_json::json!({ "pruned": removed }));
        return Ok(());
    }

    println!("Pruned {removed} old history entries");
    Ok(())
}
